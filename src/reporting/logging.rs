use crate::config::Config;
use crate::validation::{RowVerdict, UrlOutcome, ValidationReport};
use log::{debug, error, info, warn};

/// Initialize the logger with a level derived from verbosity flags.
///
/// `RUST_LOG` still overrides the computed level. Calling this more than once
/// is harmless; later calls are ignored.
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let initialized = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        debug!("Logger initialized with level: {level:?}");
    }
}

pub fn log_config_info(config: &Config) {
    info!(
        "Configuration: row_timeout={}s, url_timeout={}s, ignore_empty={}",
        config.row_timeout_duration().as_secs(),
        config.url_timeout_duration().as_secs(),
        config.ignore_empty()
    );
    info!("Ignored references: {}", config.ignored_urls().len());
    debug!("User agent: {}", config.user_agent());
}

pub fn log_dataset_loaded(source: &str, rows: usize, columns: usize) {
    info!("Loaded {rows} row(s) with {columns} column(s) from {source}");
}

pub fn log_validation_start(row_count: usize) {
    info!("Starting reference validation of {row_count} row(s)");
}

/// Per-URL results are only interesting when debugging a specific row.
pub fn log_url_result(url: &str, outcome: &UrlOutcome) {
    if outcome.is_flagged() {
        debug!("✗ {url} -> {outcome}");
    } else {
        debug!("✓ {url} -> {outcome}");
    }
}

pub fn log_row_verdict(row: usize, field: &str, verdict: RowVerdict) {
    match verdict {
        RowVerdict::Indeterminate => {
            warn!("Row {row}: reference check did not finish in time, flagging: {field:?}")
        }
        RowVerdict::Flagged => debug!("Row {row}: flagged: {field:?}"),
        other => debug!("Row {row}: {other:?}"),
    }
}

pub fn log_validation_complete(report: &ValidationReport, duration_ms: u128) {
    let checked = report.verdicts().len();
    let flagged = report.flagged_count();

    if flagged == 0 {
        info!("✅ Validation complete: {checked} row(s), none flagged ({duration_ms}ms)");
    } else {
        warn!(
            "❌ Validation complete: {flagged}/{checked} row(s) flagged, {} unfinished ({duration_ms}ms)",
            report.indeterminate_count()
        );
    }
}

pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}
