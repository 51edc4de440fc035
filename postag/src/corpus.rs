use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{PosError, Result};

/// Column holding the comment text in scraped comment tables.
pub const DEFAULT_COMMENT_COLUMN: &str = "Comment";

/// The comment column of a tabular corpus, as raw cell values in row order.
///
/// Cells are kept as JSON values so that non-text cells (numbers, nulls,
/// missing columns) survive loading and can be reported by the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    values: Vec<Value>,
}

impl Corpus {
    pub fn from_values(values: Vec<Value>) -> Self {
        Corpus { values }
    }

    /// Loads a corpus file.
    ///
    /// # Arguments
    /// * `path` - A CSV file with a header row if the extension is `.csv`,
    ///   otherwise a JSON array of row objects or JSON Lines with one row
    ///   object per line.
    /// * `column` - The name of the comment column.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, a JSON row is
    /// not an object, or a CSV header lacks `column`.
    pub fn load(path: &Path, column: &str) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::from_csv_reader(File::open(path)?, column)
        } else {
            let text = fs::read_to_string(path)?;
            Self::parse(&text, column)
        }
    }

    /// Reads the `column` cells of a CSV table with a header row.
    ///
    /// Empty cells and cells missing from short rows become [`Value::Null`],
    /// so the pipeline reports them instead of counting an empty comment.
    pub fn from_csv_reader<R: Read>(reader: R, column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let idx = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| PosError::Corpus(format!("missing column '{}'", column)))?;

        let mut values = Vec::new();
        for record in reader.records() {
            let record = record?;
            let value = match record.get(idx) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            values.push(value);
        }

        Ok(Corpus { values })
    }

    /// Parses corpus text; see [`Corpus::load`] for the accepted formats.
    pub fn parse(text: &str, column: &str) -> Result<Self> {
        let rows: Vec<Value> = if text.trim_start().starts_with('[') {
            serde_json::from_str(text)?
        } else {
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<std::result::Result<Vec<Value>, _>>()?
        };

        let values = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Object(mut fields) => Ok(fields.remove(column).unwrap_or(Value::Null)),
                other => Err(PosError::Corpus(format!(
                    "row {} is a {}, expected an object",
                    i,
                    value_type(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Corpus { values })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Corpus {
    fn from(values: Vec<Value>) -> Self {
        Corpus::from_values(values)
    }
}

/// Name of the JSON type of a cell, for diagnostics.
pub fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
