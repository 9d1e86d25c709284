// Command-line interface definitions and parsing for cpdb-refcheck

use crate::config::CliConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // Input & Output
    /// CSV file to check instead of fetching policies from the API
    #[arg(
        short = 'i',
        long = "input_csv",
        visible_alias = "input-csv",
        value_name = "PATH",
        help_heading = "Input & Output"
    )]
    pub input_csv: Option<String>,

    /// Write flagged rows to this CSV file instead of the spreadsheet
    #[arg(
        short = 'o',
        long = "output_csv",
        visible_alias = "output-csv",
        value_name = "PATH",
        help_heading = "Input & Output"
    )]
    pub output_csv: Option<String>,

    /// Spreadsheet that receives the dated worksheet
    #[arg(long, value_name = "ID", help_heading = "Input & Output")]
    pub spreadsheet_id: Option<String>,

    // Reference Checks
    /// Time budget for all URLs of one row in seconds (default: 8)
    #[arg(long, value_name = "SECONDS", help_heading = "Reference Checks")]
    pub row_timeout: Option<u64>,

    /// Time budget for a single URL in seconds (default: 5)
    #[arg(long, value_name = "SECONDS", help_heading = "Reference Checks")]
    pub url_timeout: Option<u64>,

    /// Do not flag rows with an empty reference
    #[arg(long, help_heading = "Reference Checks")]
    pub ignore_empty: bool,

    /// Reference that is never flagged (repeatable)
    #[arg(long = "ignore-url", value_name = "URL", help_heading = "Reference Checks")]
    pub ignore_urls: Vec<String>,

    /// Custom User-Agent header
    #[arg(long, value_name = "AGENT", help_heading = "Reference Checks")]
    pub user_agent: Option<String>,

    // Policy Filters
    /// Policy database API endpoint
    #[arg(long, value_name = "URL", help_heading = "Policy Filters")]
    pub api_url: Option<String>,

    /// ISO country code
    #[arg(long, value_name = "ISO", help_heading = "Policy Filters")]
    pub country: Option<String>,

    /// Decision year (repeatable)
    #[arg(long = "decision-date", value_name = "YEAR", help_heading = "Policy Filters")]
    pub decision_dates: Vec<String>,

    /// Implementation status, e.g. "in force"
    #[arg(long, value_name = "STATUS", help_heading = "Policy Filters")]
    pub status: Option<String>,

    /// Sector (repeatable)
    #[arg(long = "sector", value_name = "SECTOR", help_heading = "Policy Filters")]
    pub sectors: Vec<String>,

    /// Policy instrument (repeatable)
    #[arg(long = "policy-instrument", value_name = "INSTRUMENT", help_heading = "Policy Filters")]
    pub policy_instruments: Vec<String>,

    /// Mitigation area (repeatable)
    #[arg(long = "mitigation-area", value_name = "AREA", help_heading = "Policy Filters")]
    pub mitigation_areas: Vec<String>,

    // Output & Verbosity
    /// Suppress progress output and logs
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Disable progress bars
    #[arg(long, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

/// Convert parsed CLI arguments to the layer merged over file configuration.
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    CliConfig {
        input_csv: cli.input_csv.clone(),
        output_csv: cli.output_csv.clone(),
        row_timeout: cli.row_timeout,
        url_timeout: cli.url_timeout,
        ignore_empty: cli.ignore_empty,
        ignored_urls: trimmed(&cli.ignore_urls),
        user_agent: cli.user_agent.clone(),
        api_url: cli.api_url.clone(),
        country: cli.country.clone(),
        decision_dates: trimmed(&cli.decision_dates),
        status: cli.status.clone(),
        sectors: trimmed(&cli.sectors),
        policy_instruments: trimmed(&cli.policy_instruments),
        mitigation_areas: trimmed(&cli.mitigation_areas),
        spreadsheet_id: cli.spreadsheet_id.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_progress: cli.no_progress,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
