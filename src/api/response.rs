use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

use crate::core::{Dataset, Result};

/// Policies returned by the API, both as received and as a table.
#[derive(Debug, Clone)]
pub struct PolicyResponse {
    raw: Value,
    dataset: Dataset,
}

impl PolicyResponse {
    pub fn new(raw: Value, dataset: Dataset) -> Self {
        Self { raw, dataset }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Write the response body exactly as received.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, &self.raw)?;
        Ok(())
    }

    /// Write the tabular form, header first, without a row index column.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.dataset.write_csv_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn response() -> PolicyResponse {
        let raw = json!([
            {"policy_id": 1, "reference": "http://a.test", "sectors": ["Transport"]},
            {"policy_id": 2, "reference": null}
        ]);
        let dataset = Dataset::from_json_records(&raw).unwrap();
        PolicyResponse::new(raw, dataset)
    }

    #[test]
    fn test_save_json_round_trips() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("policies.json");
        let response = response();

        response.save_json(&path)?;

        let reloaded: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(&reloaded, response.raw());
        Ok(())
    }

    #[test]
    fn test_save_csv_writes_table() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("policies.csv");

        response().save_csv(&path)?;

        let contents = std::fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "policy_id,reference,sectors\n1,http://a.test,Transport\n2,,\n"
        );
        Ok(())
    }

    #[test]
    fn test_into_dataset() {
        let dataset = response().into_dataset();
        assert_eq!(dataset.len(), 2);
    }
}
