use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::{Dataset, Result};
use crate::sink::{InputShape, ResultSink};

/// Writes flagged rows to a CSV file, replacing any existing file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for CsvSink {
    async fn write(&self, flagged: &Dataset, _input: InputShape) -> Result<()> {
        flagged.write_csv_path(&self.path)?;
        log::info!("Wrote {} flagged row(s) to {}", flagged.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
