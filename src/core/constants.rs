/// Application-wide constants to avoid magic values throughout the codebase.
/// Column names of the policy dataset
pub mod columns {
    /// Column holding one or more reference URLs for a policy
    pub const REFERENCE: &str = "reference";
}

/// HTTP status code constants
pub mod http_status {
    /// Responses with a status strictly above this value are flagged.
    /// 400 itself passes.
    pub const FLAG_ABOVE: u16 = 400;
    /// HTTP 200 OK - successful response
    pub const OK: u16 = 200;
    /// HTTP 401 Unauthorized - the page exists behind a login, never flagged
    pub const UNAUTHORIZED: u16 = 401;
    /// HTTP 404 Not Found - resource not found
    pub const NOT_FOUND: u16 = 404;
    /// HTTP 500 Internal Server Error - server error
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default wall-clock budget for checking every URL of one row, in seconds
    pub const DEFAULT_ROW_TIMEOUT_SECONDS: u64 = 8;
    /// Default budget for a single URL request, in seconds
    pub const DEFAULT_URL_TIMEOUT_SECONDS: u64 = 5;
    /// Timeout for the policy database API request, in seconds
    pub const API_TIMEOUT_SECONDS: u64 = 300;
    /// Timeout for each spreadsheet API call, in seconds
    pub const SHEETS_TIMEOUT_SECONDS: u64 = 60;
    /// Largest accepted timeout (1 hour)
    pub const MAX_TIMEOUT_SECONDS: u64 = 3600;
}

/// Network constants
pub mod network {
    /// Browser user agent sent with reference checks; some sites block
    /// obvious bots and would otherwise be reported as broken.
    pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/56.0.2924.76 Safari/537.36";
    /// Maximum number of redirects followed per reference check
    pub const MAX_REDIRECTS: usize = 10;
}

/// Policy database API constants
pub mod api {
    /// Default endpoint of the Climate Policy Database API
    pub const DEFAULT_API_URL: &str = "http://cpdb-dev.waat.eu/api/v1/climate-policies";
    /// Environment variable holding the API user name
    pub const USER_ENV: &str = "CPDB_API_USER";
    /// Environment variable holding the API password
    pub const PASSWORD_ENV: &str = "CPDB_API_PASSWORD";
}

/// Spreadsheet sink constants
pub mod sheets {
    /// Base URL of the Google Sheets v4 REST API
    pub const DEFAULT_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
    /// Environment variable holding an OAuth bearer token for the Sheets API
    pub const TOKEN_ENV: &str = "CPDB_SHEETS_TOKEN";
    /// Worksheet title format (one worksheet per day)
    pub const WORKSHEET_DATE_FORMAT: &str = "%Y-%m-%d";
    /// Spare rows added when a worksheet is created
    pub const EXTRA_ROWS: usize = 10;
}

/// Default configuration values
pub mod defaults {
    /// References that are valid but routinely fail automated checks
    pub const IGNORED_URLS: [&str; 1] = ["http://www.climatechange.gov.au"];
    /// Empty reference fields are flagged unless explicitly skipped
    pub const IGNORE_EMPTY: bool = false;
    /// Name of the configuration file searched for in the working directory
    pub const CONFIG_FILE_NAME: &str = ".cpdb-refcheck.toml";
}
