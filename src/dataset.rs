//! Customer dataset ingest and lookup.
//!
//! Turns the application CSV into an id-keyed record store. Row-level
//! problems (bad id, wrong arity) skip the row and are reported, never
//! fatal; a dataset with no usable rows at all is.

use crate::error::ScoringError;
use crate::types::{CustomerId, RawRecord, RawValue};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based line in the source file, counting the header.
    pub line: usize,
    pub message: String,
}

/// Id-keyed store of customer records, immutable after load.
#[derive(Debug)]
pub struct CustomerDataset {
    rows: HashMap<CustomerId, RawRecord>,
    columns: Vec<String>,
    id_column: String,
    id_min: CustomerId,
    id_max: CustomerId,
    rows_read: usize,
    row_errors: Vec<RowError>,
}

impl CustomerDataset {
    /// Load the dataset from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P, id_column: &str) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ScoringError::resource(format!("customer dataset {}", path.display()), e)
        })?;

        let dataset = Self::from_reader(file, id_column)?;
        if !dataset.row_errors.is_empty() {
            warn!(
                skipped = dataset.row_errors.len(),
                "Skipped unusable dataset rows"
            );
        }
        info!(
            path = %path.display(),
            customers = dataset.len(),
            rows_read = dataset.rows_read,
            "Customer dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse the dataset from any reader. The id column must be present
    /// in the header; each row's id must be a positive integer.
    pub fn from_reader<R: Read>(reader: R, id_column: &str) -> Result<Self, ScoringError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ScoringError::resource("customer dataset", e))?
            .clone();
        let columns: Vec<String> = headers.iter().map(String::from).collect();

        let id_index = columns
            .iter()
            .position(|c| c == id_column)
            .ok_or_else(|| {
                ScoringError::resource(
                    "customer dataset",
                    format!("missing id column '{id_column}'"),
                )
            })?;

        let mut rows: HashMap<CustomerId, RawRecord> = HashMap::new();
        let mut row_errors = Vec::new();
        let mut rows_read = 0usize;

        for (i, result) in csv_reader.records().enumerate() {
            let line = i + 2;
            rows_read += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    row_errors.push(RowError {
                        line,
                        message: format!("unreadable row: {e}"),
                    });
                    continue;
                }
            };

            if record.len() != columns.len() {
                row_errors.push(RowError {
                    line,
                    message: format!(
                        "expected {} fields, found {}",
                        columns.len(),
                        record.len()
                    ),
                });
                continue;
            }

            let id_raw = record.get(id_index).unwrap_or("");
            let id = match id_raw.parse::<CustomerId>() {
                Ok(id) if id > 0 => id,
                _ => {
                    row_errors.push(RowError {
                        line,
                        message: format!("invalid {id_column} '{id_raw}'"),
                    });
                    continue;
                }
            };

            if rows.contains_key(&id) {
                row_errors.push(RowError {
                    line,
                    message: format!("duplicate {id_column} {id}"),
                });
                continue;
            }

            let raw: RawRecord = columns
                .iter()
                .zip(record.iter())
                .map(|(column, field)| (column.clone(), parse_field(field)))
                .collect();
            rows.insert(id, raw);
        }

        if rows.is_empty() {
            return Err(ScoringError::resource("customer dataset", "no usable rows"));
        }

        let id_min = *rows.keys().min().unwrap_or(&0);
        let id_max = *rows.keys().max().unwrap_or(&0);

        Ok(Self {
            rows,
            columns,
            id_column: id_column.to_string(),
            id_min,
            id_max,
            rows_read,
            row_errors,
        })
    }

    /// Look up one customer. A miss is a normal negative result.
    pub fn get(&self, id: CustomerId) -> Option<&RawRecord> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: CustomerId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Smallest and largest known identifier, for input bounds in the
    /// presentation layer.
    pub fn id_range(&self) -> Option<(CustomerId, CustomerId)> {
        if self.rows.is_empty() {
            None
        } else {
            Some((self.id_min, self.id_max))
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn row_errors(&self) -> &[RowError] {
        &self.row_errors
    }

    /// Iterate all records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.rows.values()
    }
}

fn parse_field(raw: &str) -> RawValue {
    if raw.is_empty() {
        return RawValue::Missing;
    }
    if let Ok(number) = raw.parse::<f64>() {
        return RawValue::Number(number);
    }
    if raw.eq_ignore_ascii_case("true") {
        return RawValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return RawValue::Bool(false);
    }
    RawValue::Text(raw.to_string())
}

/// Human-readable column glossary, display-only.
pub struct ColumnDescriptions {
    entries: HashMap<String, String>,
}

impl ColumnDescriptions {
    /// Load descriptions from a CSV with `Row` (column name) and
    /// `Description` columns. The first occurrence of a name wins.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ScoringError::resource(format!("column descriptions {}", path.display()), e)
        })?;
        let descriptions = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            columns = descriptions.len(),
            "Column descriptions loaded"
        );
        Ok(descriptions)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScoringError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ScoringError::resource("column descriptions", e))?
            .clone();

        let name_index = headers.iter().position(|h| h == "Row");
        let description_index = headers.iter().position(|h| h == "Description");
        let (name_index, description_index) = match (name_index, description_index) {
            (Some(n), Some(d)) => (n, d),
            _ => {
                return Err(ScoringError::resource(
                    "column descriptions",
                    "missing 'Row' or 'Description' column",
                ))
            }
        };

        let mut entries = HashMap::new();
        for record in csv_reader.records().flatten() {
            let name = record.get(name_index).unwrap_or("").to_string();
            let description = record.get(description_index).unwrap_or("").to_string();
            if name.is_empty() || description.is_empty() {
                continue;
            }
            entries.entry(name).or_insert(description);
        }

        Ok(Self { entries })
    }

    pub fn describe(&self, column: &str) -> Option<&str> {
        self.entries.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
