//! Destinations for flagged rows
//!
//! A run writes its flagged rows to exactly one sink: a local CSV file or a
//! dated worksheet in a spreadsheet.

use async_trait::async_trait;

use crate::core::{Dataset, Result};

pub mod csv;
pub mod sheets;

pub use self::csv::CsvSink;
pub use self::sheets::SheetsSink;

/// Size of the dataset the flagged rows were selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub rows: usize,
    pub columns: usize,
}

impl InputShape {
    pub fn of(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.len(),
            columns: dataset.columns().len(),
        }
    }
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist `flagged`, header included.
    async fn write(&self, flagged: &Dataset, input: InputShape) -> Result<()>;

    /// Human-readable destination, for logs and the final message.
    fn describe(&self) -> String;
}
