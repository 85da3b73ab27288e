use chrono::{Datelike, NaiveDate};

/// Number of model inputs: day-of-week, month, day-of-month, product code.
pub const N_FEATURES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureVector {
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub month: u32,
    pub day: u32,
    pub product_code: usize,
}

impl FeatureVector {
    pub fn new(date: NaiveDate, product_code: usize) -> Self {
        Self {
            day_of_week: date.weekday().num_days_from_monday(),
            month: date.month(),
            day: date.day(),
            product_code,
        }
    }

    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            f64::from(self.day_of_week),
            f64::from(self.month),
            f64::from(self.day),
            self.product_code as f64,
        ]
    }
}
