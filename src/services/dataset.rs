//! CSV loading and cleaning for the training pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::TrainError;
use crate::models::SalesRecord;

pub const DATE_COLUMN: &str = "date";
pub const QUANTITY_COLUMN: &str = "quantity";
pub const PRODUCT_COLUMN: &str = "item_name";
pub const TIME_OF_SALE_COLUMN: &str = "time_of_sale";

/// Date layouts tried, in order, until one parses. Numeric layouts are
/// month-first when ambiguous. Two-digit years come before four-digit ones
/// because `%Y` also accepts short years.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Row accounting from a single load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub dropped_bad_date: usize,
    pub dropped_missing_quantity: usize,
    pub dropped_missing_product: usize,
    pub coerced_quantity: usize,
}

impl LoadStats {
    pub fn dropped(&self) -> usize {
        self.dropped_bad_date + self.dropped_missing_quantity + self.dropped_missing_product
    }
}

/// Cleaned training data.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<SalesRecord>,
    /// Whether the source had a time-of-sale column at all.
    pub has_time_of_sale: bool,
    pub stats: LoadStats,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }
}

/// Reads and cleans the CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, TrainError> {
    if !path.exists() {
        return Err(TrainError::DatasetNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let dataset = read_dataset(file)?;
    info!(
        path = %path.display(),
        records = dataset.len(),
        dropped = dataset.stats.dropped(),
        coerced = dataset.stats.coerced_quantity,
        "dataset loaded"
    );
    Ok(dataset)
}

/// Reads and cleans CSV text from any reader.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, TrainError> {
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut dates = DateParser::default();
    let mut stats = LoadStats::default();
    let mut records = Vec::new();

    for row in csv.records() {
        let row = row?;
        stats.rows_read += 1;

        let Some(date) = dates.parse(cell(&row, columns.date)) else {
            stats.dropped_bad_date += 1;
            continue;
        };

        let raw_quantity = cell(&row, columns.quantity);
        if raw_quantity.is_empty() {
            stats.dropped_missing_quantity += 1;
            continue;
        }
        let quantity = match raw_quantity.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                stats.coerced_quantity += 1;
                0.0
            }
        };

        let product = cell(&row, columns.product);
        if product.is_empty() {
            stats.dropped_missing_product += 1;
            continue;
        }

        let time_of_sale = columns
            .time_of_sale
            .map(|idx| cell(&row, idx))
            .filter(|bucket| !bucket.is_empty())
            .map(str::to_string);

        records.push(SalesRecord::new(date, product, quantity, time_of_sale));
    }

    if let Some(format) = dates.format {
        debug!(format, "inferred dataset date format");
    }
    if stats.dropped() > 0 {
        warn!(
            bad_date = stats.dropped_bad_date,
            missing_quantity = stats.dropped_missing_quantity,
            missing_product = stats.dropped_missing_product,
            "dropped unusable dataset rows"
        );
    }

    Ok(Dataset {
        records,
        has_time_of_sale: columns.time_of_sale.is_some(),
        stats,
    })
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

struct Columns {
    date: usize,
    quantity: usize,
    product: usize,
    time_of_sale: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, TrainError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Ok(Self {
            date: find(DATE_COLUMN).ok_or(TrainError::MissingColumn(DATE_COLUMN))?,
            quantity: find(QUANTITY_COLUMN).ok_or(TrainError::MissingColumn(QUANTITY_COLUMN))?,
            product: find(PRODUCT_COLUMN).ok_or(TrainError::MissingColumn(PRODUCT_COLUMN))?,
            time_of_sale: find(TIME_OF_SALE_COLUMN),
        })
    }
}

/// Parses date cells, fixing the layout on the first cell that parses.
#[derive(Debug, Default)]
struct DateParser {
    format: Option<&'static str>,
}

impl DateParser {
    fn parse(&mut self, raw: &str) -> Option<NaiveDate> {
        if raw.is_empty() {
            return None;
        }
        match self.format {
            Some(format) => parse_with(raw, format),
            None => {
                let (format, date) = DATE_FORMATS
                    .iter()
                    .chain(DATETIME_FORMATS)
                    .find_map(|format| parse_with(raw, format).map(|date| (*format, date)))?;
                self.format = Some(format);
                Some(date)
            }
        }
    }
}

fn parse_with(raw: &str, format: &str) -> Option<NaiveDate> {
    if DATETIME_FORMATS.contains(&format) {
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(raw, format).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cleans_rows() {
        let csv = "\
date,item_name,quantity,time_of_sale
2024-01-01,Apple,10,Morning
not-a-date,Apple,4,Morning
2024-01-02,Apple,,Night
2024-01-03,Apple,lots,Night
2024-01-04,,3,Night
2024-01-05,Tea,-2,
";
        let dataset = read_dataset(csv.as_bytes()).unwrap();
        assert!(dataset.has_time_of_sale);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.stats.rows_read, 6);
        assert_eq!(dataset.stats.dropped_bad_date, 1);
        assert_eq!(dataset.stats.dropped_missing_quantity, 1);
        assert_eq!(dataset.stats.dropped_missing_product, 1);
        assert_eq!(dataset.stats.coerced_quantity, 1);

        let records = &dataset.records;
        assert_eq!(records[0].quantity, 10.0);
        assert_eq!(records[0].time_of_sale.as_deref(), Some("Morning"));
        assert_eq!(records[1].date, date(2024, 1, 3));
        assert_eq!(records[1].quantity, 0.0);
        assert_eq!(records[2].product, "Tea");
        assert_eq!(records[2].quantity, 0.0);
        assert_eq!(records[2].time_of_sale, None);
    }

    #[test]
    fn first_parseable_cell_fixes_the_format() {
        let csv = "\
date,item_name,quantity
03/04/2023,Apple,1
2023-04-05,Apple,1
12/31/2023,Apple,1
";
        let dataset = read_dataset(csv.as_bytes()).unwrap();
        let dates: Vec<_> = dataset.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2023, 3, 4), date(2023, 12, 31)]);
        assert_eq!(dataset.max_date(), Some(date(2023, 12, 31)));
    }

    #[test]
    fn datetime_cells_keep_the_date() {
        let csv = "date,item_name,quantity\n2023-06-01 14:30:00,Tea,2\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(dataset.records[0].date, date(2023, 6, 1));
    }

    #[test]
    fn time_of_sale_column_is_optional() {
        let csv = "date,item_name,quantity\n2023-06-01,Tea,2\n";
        let dataset = read_dataset(csv.as_bytes()).unwrap();
        assert!(!dataset.has_time_of_sale);
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn missing_required_column() {
        let csv = "date,product,quantity\n2023-06-01,Tea,2\n";
        assert_matches!(
            read_dataset(csv.as_bytes()),
            Err(TrainError::MissingColumn("item_name"))
        );
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            load_dataset(&dir.path().join("nope.csv")),
            Err(TrainError::DatasetNotFound(_))
        );
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,item_name,quantity,time_of_sale").unwrap();
        writeln!(file, "2024-02-01,Bread,5,Afternoon").unwrap();
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }
}
