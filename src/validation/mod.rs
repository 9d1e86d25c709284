//! Reference URL validation
//!
//! Splits `reference` fields into URLs, checks each one over HTTP and
//! decides per row whether the reference is broken.

pub mod checker;
pub mod extract;
pub mod validator;

// Re-export commonly used items
pub use checker::{HttpProbe, ReqwestProbe, UrlChecker, UrlOutcome, parse_reference_url};
pub use extract::{IgnoreList, extract_urls};
pub use validator::{ReferenceValidator, RowVerdict, ValidationReport, ValidatorSettings};
