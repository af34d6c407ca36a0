//! Tabular dataset built from stacked test records

use serde_json::{Map, Value};

/// One test record: a flat JSON object, keys in file order
pub type Record = Map<String, Value>;

static NULL: Value = Value::Null;

/// Rows of test records plus the union of their columns.
///
/// Columns keep first-seen order across records. A record that lacks a
/// column reads as `null` for it; no other schema reconciliation happens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset by stacking records in iteration order
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut dataset = Self::new();
        for record in records {
            dataset.push_record(record);
        }
        dataset
    }

    /// Append one record as the last row
    pub fn push_record(&mut self, record: Record) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(record);
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Cell value, `null` when the row has no such column
    pub fn value(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// All values of a column in row order
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |r| r.get(column).unwrap_or(&NULL))
    }
}
