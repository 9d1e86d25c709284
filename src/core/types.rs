use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde_json::Value;

use crate::core::error::{CpdbError, Result};

/// One row of a policy dataset.
///
/// Values are positional and line up with [`Dataset::columns`]. A missing
/// value is always the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    /// Value at the given column index, or `""` when out of range.
    pub fn get(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Ordered, column-named table of records.
///
/// Both the CSV loader and the API response produce a `Dataset`, and both
/// sinks consume one. Selection methods always return a fresh copy; a
/// `Dataset` is never mutated by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty values.
    pub fn push<S: Into<String>>(&mut self, values: impl IntoIterator<Item = S>) -> Result<()> {
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() > self.columns.len() {
            return Err(CpdbError::InvalidArgument(format!(
                "row has {} values but the dataset has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        values.resize(self.columns.len(), String::new());
        self.records.push(Record { values });
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Like [`Dataset::column_index`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CpdbError::MissingColumn {
                column: name.to_string(),
                found: self.columns.clone(),
            })
    }

    /// Copy of the rows whose entry in `mask` is `true`, in their original order.
    pub fn select(&self, mask: &[bool]) -> Dataset {
        let records = self
            .records
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(record, _)| record.clone())
            .collect();

        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Header row followed by every record, the shape spreadsheet APIs expect.
    pub fn to_rows_with_header(&self) -> Vec<Vec<String>> {
        std::iter::once(self.columns.clone())
            .chain(self.records.iter().map(|record| record.values.clone()))
            .collect()
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Read delimited text with a header row. The first header loses any BOM.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim_matches('\u{feff}').to_string())
            .collect();
        let mut dataset = Dataset::new(columns);

        for record in reader.records() {
            let record = record?;
            dataset.push(record.iter())?;
        }

        Ok(dataset)
    }

    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(file)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(&self.columns)?;
        for record in &self.records {
            writer.write_record(&record.values)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Build a dataset from a JSON array of objects.
    ///
    /// Columns are the union of object keys in order of first appearance.
    /// `null` and absent keys become empty strings, arrays are joined with
    /// commas, and other scalars use their JSON text.
    pub fn from_json_records(value: &Value) -> Result<Self> {
        let Some(items) = value.as_array() else {
            return Err(CpdbError::InvalidArgument(
                "expected a JSON array of records".to_string(),
            ));
        };

        let mut columns: Vec<String> = Vec::new();
        for item in items {
            let Some(object) = item.as_object() else {
                return Err(CpdbError::InvalidArgument(format!(
                    "expected a JSON object per record, found: {item}"
                )));
            };
            for key in object.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut dataset = Dataset::new(columns.clone());
        for item in items {
            let row = columns
                .iter()
                .map(|column| item.get(column).map(render_json_cell).unwrap_or_default());
            dataset.push(row)?;
        }

        Ok(dataset)
    }
}

fn render_json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_json_cell)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
