use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cleaned row of historical sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product: String,
    /// Units sold; never negative once cleaned.
    pub quantity: f64,
    /// Time-of-sale bucket such as "Morning" or "Night", when the dataset has one.
    pub time_of_sale: Option<String>,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        product: impl Into<String>,
        quantity: f64,
        time_of_sale: Option<String>,
    ) -> Self {
        Self {
            date,
            product: product.into(),
            quantity: quantity.max(0.0),
            time_of_sale,
        }
    }
}
