//! Client for the Climate Policy Database and a checker for broken policy
//! references.
//!
//! Policies come either from a CSV export or from the database API. Every
//! row's `reference` field is split into URLs and each URL is requested; rows
//! with a malformed, unreachable or failing reference are written to a CSV
//! file or to a dated spreadsheet worksheet.

pub mod api;
pub mod config;
pub mod core;
pub mod reporting;
pub mod sink;
pub mod ui;
pub mod validation;

pub use crate::core::{CpdbError, Dataset, Record, Result};
pub use api::{PolicyRequest, PolicyResponse};
pub use config::Config;
pub use validation::{ReferenceValidator, RowVerdict, ValidationReport, ValidatorSettings};
