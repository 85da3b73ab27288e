pub mod dashboard;
pub mod forecast;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
