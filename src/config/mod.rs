//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files, environment variables and CLI arguments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::constants::{api, defaults, network, sheets, timeouts};
use crate::core::error::{CpdbError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wall-clock budget in seconds for checking all URLs of one row
    pub row_timeout: Option<u64>,

    /// Budget in seconds for a single URL request
    pub url_timeout: Option<u64>,

    /// Do not flag rows whose reference field is empty
    pub ignore_empty: Option<bool>,

    /// References that are never flagged
    pub ignored_urls: Option<Vec<String>>,

    /// User-Agent header sent with reference checks
    pub user_agent: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Policy database API settings
    pub api: ApiConfig,

    /// Spreadsheet upload settings
    pub sheets: SheetsConfig,
}

/// Connection and filter settings for the policy database API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub country: Option<String>,
    pub decision_dates: Option<Vec<String>>,
    pub status: Option<String>,
    pub sectors: Option<Vec<String>>,
    pub policy_instruments: Option<Vec<String>>,
    pub mitigation_areas: Option<Vec<String>>,
}

/// Destination spreadsheet for flagged rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Identifier of the target spreadsheet (the part after `/d/` in its URL)
    pub spreadsheet_id: Option<String>,
    /// Base URL of the Sheets REST API
    pub api_url: Option<String>,
    /// OAuth bearer token; prefer the environment variable
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CpdbError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CpdbError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        if let Ok(config) = Self::load_from_file(defaults::CONFIG_FILE_NAME) {
            return config;
        }

        // Parent directories, up to 3 levels
        for i in 1..=3 {
            let path = format!("{}{}", "../".repeat(i), defaults::CONFIG_FILE_NAME);
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Fill credentials that are still unset from the environment
    pub fn apply_env(&mut self) {
        if self.api.user.is_none() {
            self.api.user = std::env::var(api::USER_ENV).ok();
        }
        if self.api.password.is_none() {
            self.api.password = std::env::var(api::PASSWORD_ENV).ok();
        }
        if self.sheets.token.is_none() {
            self.sheets.token = std::env::var(sheets::TOKEN_ENV).ok();
        }
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Validator
        if let Some(row_timeout) = cli_config.row_timeout {
            self.row_timeout = Some(row_timeout);
        }
        if let Some(url_timeout) = cli_config.url_timeout {
            self.url_timeout = Some(url_timeout);
        }
        if cli_config.ignore_empty {
            self.ignore_empty = Some(true);
        }
        if !cli_config.ignored_urls.is_empty() {
            let ignored = self.ignored_urls.get_or_insert_with(default_ignored_urls);
            for url in &cli_config.ignored_urls {
                if !ignored.contains(url) {
                    ignored.push(url.clone());
                }
            }
        }
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }

        // API filters
        if let Some(ref api_url) = cli_config.api_url {
            self.api.url = Some(api_url.clone());
        }
        if let Some(ref country) = cli_config.country {
            self.api.country = Some(country.clone());
        }
        if !cli_config.decision_dates.is_empty() {
            self.api.decision_dates = Some(cli_config.decision_dates.clone());
        }
        if let Some(ref status) = cli_config.status {
            self.api.status = Some(status.clone());
        }
        if !cli_config.sectors.is_empty() {
            self.api.sectors = Some(cli_config.sectors.clone());
        }
        if !cli_config.policy_instruments.is_empty() {
            self.api.policy_instruments = Some(cli_config.policy_instruments.clone());
        }
        if !cli_config.mitigation_areas.is_empty() {
            self.api.mitigation_areas = Some(cli_config.mitigation_areas.clone());
        }

        // Spreadsheet
        if let Some(ref spreadsheet_id) = cli_config.spreadsheet_id {
            self.sheets.spreadsheet_id = Some(spreadsheet_id.clone());
        }

        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    pub fn row_timeout_duration(&self) -> Duration {
        Duration::from_secs(
            self.row_timeout
                .unwrap_or(timeouts::DEFAULT_ROW_TIMEOUT_SECONDS),
        )
    }

    pub fn url_timeout_duration(&self) -> Duration {
        Duration::from_secs(
            self.url_timeout
                .unwrap_or(timeouts::DEFAULT_URL_TIMEOUT_SECONDS),
        )
    }

    pub fn ignore_empty(&self) -> bool {
        self.ignore_empty.unwrap_or(defaults::IGNORE_EMPTY)
    }

    pub fn ignored_urls(&self) -> Vec<String> {
        self.ignored_urls.clone().unwrap_or_else(default_ignored_urls)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .unwrap_or(network::BROWSER_USER_AGENT)
    }

    pub fn api_url(&self) -> &str {
        self.api.url.as_deref().unwrap_or(api::DEFAULT_API_URL)
    }

    pub fn sheets_api_url(&self) -> &str {
        self.sheets
            .api_url
            .as_deref()
            .unwrap_or(sheets::DEFAULT_API_URL)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("row_timeout", self.row_timeout), ("url_timeout", self.url_timeout)] {
            if let Some(seconds) = value {
                if seconds == 0 {
                    return Err(CpdbError::Config(format!(
                        "{name} cannot be 0. Expected a positive integer representing seconds."
                    )));
                }
                if seconds > timeouts::MAX_TIMEOUT_SECONDS {
                    return Err(CpdbError::Config(format!(
                        "{name} of {seconds} seconds is larger than the maximum of {} seconds.",
                        timeouts::MAX_TIMEOUT_SECONDS
                    )));
                }
            }
        }

        // A row may hold several URLs, so its budget must exceed one request's.
        if self.row_timeout_duration() <= self.url_timeout_duration() {
            return Err(CpdbError::Config(format!(
                "row_timeout ({}s) must be greater than url_timeout ({}s).",
                self.row_timeout_duration().as_secs(),
                self.url_timeout_duration().as_secs()
            )));
        }

        if self.user_agent().trim().is_empty() {
            return Err(CpdbError::Config(
                "user_agent cannot be empty.".to_string(),
            ));
        }

        if let Err(e) = reqwest::Url::parse(self.api_url()) {
            return Err(CpdbError::Config(format!(
                "API URL '{}' is not a valid URL: {e}",
                self.api_url()
            )));
        }

        if let Err(e) = reqwest::Url::parse(self.sheets_api_url()) {
            return Err(CpdbError::Config(format!(
                "Sheets API URL '{}' is not a valid URL: {e}",
                self.sheets_api_url()
            )));
        }

        Ok(())
    }
}

fn default_ignored_urls() -> Vec<String> {
    defaults::IGNORED_URLS.iter().map(|s| s.to_string()).collect()
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Input & output
    pub input_csv: Option<String>,  // --input_csv
    pub output_csv: Option<String>, // --output_csv

    // Validator
    pub row_timeout: Option<u64>,   // --row-timeout
    pub url_timeout: Option<u64>,   // --url-timeout
    pub ignore_empty: bool,         // --ignore-empty
    pub ignored_urls: Vec<String>,  // --ignore-url
    pub user_agent: Option<String>, // --user-agent

    // API filters
    pub api_url: Option<String>,         // --api-url
    pub country: Option<String>,         // --country
    pub decision_dates: Vec<String>,     // --decision-date
    pub status: Option<String>,          // --status
    pub sectors: Vec<String>,            // --sector
    pub policy_instruments: Vec<String>, // --policy-instrument
    pub mitigation_areas: Vec<String>,   // --mitigation-area

    // Spreadsheet
    pub spreadsheet_id: Option<String>, // --spreadsheet-id

    // Output & verbosity
    pub quiet: bool,       // --quiet
    pub verbose: bool,     // --verbose
    pub no_progress: bool, // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
