use serde::{Deserialize, Serialize, Serializer};

/// Bucket label reported when no peak-hour data exists.
pub const NO_PEAK_HOUR: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakHour {
    pub bucket: String,
    pub total: f64,
}

/// Historical quantity per time-of-sale bucket, highest total first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeakHourTable {
    entries: Vec<PeakHour>,
}

impl PeakHourTable {
    /// Builds a table from per-bucket totals. Equal totals keep their input order.
    pub fn from_totals<I, K>(totals: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut entries: Vec<PeakHour> = totals
            .into_iter()
            .map(|(bucket, total)| PeakHour {
                bucket: bucket.into(),
                total,
            })
            .collect();
        sort_descending(&mut entries);
        Self { entries }
    }

    /// Returns a copy re-sorted by total, highest first.
    pub fn sorted_desc(&self) -> Self {
        let mut entries = self.entries.clone();
        sort_descending(&mut entries);
        Self { entries }
    }

    pub fn top(&self) -> Option<&PeakHour> {
        self.entries.first()
    }

    pub fn top_bucket(&self) -> &str {
        self.top()
            .map(|peak| peak.bucket.as_str())
            .unwrap_or(NO_PEAK_HOUR)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeakHour> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes as a JSON object `{bucket: total}` in table order.
    pub fn serialize_as_map<S: Serializer>(table: &Self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(table.entries.iter().map(|peak| (&peak.bucket, peak.total)))
    }
}

fn sort_descending(entries: &mut [PeakHour]) {
    entries.sort_by(|a, b| b.total.total_cmp(&a.total));
}
