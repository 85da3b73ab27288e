use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Slope above which a product counts as rising (and below its negation, falling).
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TrendStatus {
    Rising,
    Falling,
    Stable,
}

impl TrendStatus {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_SLOPE_THRESHOLD {
            Self::Rising
        } else if slope < -TREND_SLOPE_THRESHOLD {
            Self::Falling
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "Rising",
            Self::Falling => "Falling",
            Self::Stable => "Stable",
        }
    }
}

impl std::fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrendEntry {
    #[schema(example = 0.425)]
    pub slope: f64,
    pub status: TrendStatus,
}

impl TrendEntry {
    pub fn stable() -> Self {
        Self {
            slope: 0.0,
            status: TrendStatus::Stable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub product: String,
    #[serde(flatten)]
    pub entry: TrendEntry,
}

/// Per-product trend entries in the order products first appeared in the training data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendTable {
    records: Vec<TrendRecord>,
}

impl TrendTable {
    pub fn new(records: Vec<TrendRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, product: impl Into<String>, entry: TrendEntry) {
        self.records.push(TrendRecord {
            product: product.into(),
            entry,
        });
    }

    pub fn get(&self, product: &str) -> Option<&TrendEntry> {
        self.records
            .iter()
            .find(|record| record.product == product)
            .map(|record| &record.entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrendRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Products carrying `status`, in table order.
    pub fn products_with(&self, status: TrendStatus) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(move |record| record.entry.status == status)
            .map(|record| record.product.as_str())
    }

    /// Serializes as a JSON object keyed by product, keeping table order.
    pub fn serialize_as_map<S: Serializer>(table: &Self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            table
                .records
                .iter()
                .map(|record| (&record.product, &record.entry)),
        )
    }
}
