use std::fmt;

/// Error types for cpdb-refcheck operations
#[derive(Debug)]
pub enum CpdbError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// HTTP client error
    Http(reqwest::Error),

    /// CSV reading or writing error
    Csv(csv::Error),

    /// JSON decoding or encoding error
    Json(serde_json::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// A required column is absent from the input dataset
    MissingColumn { column: String, found: Vec<String> },

    /// Spreadsheet API error
    Sheets(String),

    /// Invalid argument error
    InvalidArgument(String),
}

impl fmt::Display for CpdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpdbError::Io(err) => write!(f, "IO error: {err}"),
            CpdbError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CpdbError::Http(err) => write!(f, "HTTP error: {err}"),
            CpdbError::Csv(err) => write!(f, "CSV error: {err}"),
            CpdbError::Json(err) => write!(f, "JSON error: {err}"),
            CpdbError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            CpdbError::MissingColumn { column, found } => write!(
                f,
                "Missing column: the input should contain a column named `{column}`. Found columns: {}",
                found.join(", ")
            ),
            CpdbError::Sheets(msg) => write!(f, "Spreadsheet error: {msg}"),
            CpdbError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for CpdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CpdbError::Io(err) => Some(err),
            CpdbError::Http(err) => Some(err),
            CpdbError::Csv(err) => Some(err),
            CpdbError::Json(err) => Some(err),
            CpdbError::TomlParsing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CpdbError {
    fn from(err: std::io::Error) -> Self {
        CpdbError::Io(err)
    }
}

impl From<reqwest::Error> for CpdbError {
    fn from(err: reqwest::Error) -> Self {
        CpdbError::Http(err)
    }
}

impl From<csv::Error> for CpdbError {
    fn from(err: csv::Error) -> Self {
        CpdbError::Csv(err)
    }
}

impl From<serde_json::Error> for CpdbError {
    fn from(err: serde_json::Error) -> Self {
        CpdbError::Json(err)
    }
}

impl From<toml::de::Error> for CpdbError {
    fn from(err: toml::de::Error) -> Self {
        CpdbError::TomlParsing(err)
    }
}

/// Type alias for Results using CpdbError
pub type Result<T> = std::result::Result<T, CpdbError>;
