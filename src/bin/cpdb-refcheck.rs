use clap::Parser;
use cpdb_refcheck::api::PolicyRequest;
use cpdb_refcheck::config::{CliConfig, Config};
use cpdb_refcheck::core::constants::columns;
use cpdb_refcheck::core::{Dataset, Result};
use cpdb_refcheck::reporting::logging;
use cpdb_refcheck::sink::{CsvSink, InputShape, ResultSink, SheetsSink};
use cpdb_refcheck::ui::{Cli, ProgressReporter, cli_to_config};
use cpdb_refcheck::validation::{ReferenceValidator, ValidatorSettings};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let cli_config = cli_to_config(cli);
    let mut config = load_and_merge_config(&cli_config)?;
    config.apply_env();
    config.validate()?;

    let verbose = cli_config.verbose || config.verbose.unwrap_or(false);
    logging::init_logger(verbose, cli_config.quiet);
    logging::log_config_info(&config);

    let dataset = load_dataset(&cli_config, &config).await?;
    dataset.require_column(columns::REFERENCE)?;

    let sink = create_sink(&cli_config, &config)?;
    let validator = ReferenceValidator::new(ValidatorSettings::from_config(&config))?;

    let mut progress = create_progress_reporter(&cli_config);
    let report = validator.assess(&dataset, progress.as_mut()).await?;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    sink.write(report.flagged(), InputShape::of(&dataset)).await?;

    if !cli_config.quiet {
        println!(
            "{} of {} row(s) flagged ({} unfinished), written to {}",
            report.flagged_count(),
            dataset.len(),
            report.indeterminate_count(),
            sink.describe()
        );
    }
    Ok(())
}

fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // CLI takes precedence
    config.merge_with_cli(cli_config);
    Ok(config)
}

async fn load_dataset(cli_config: &CliConfig, config: &Config) -> Result<Dataset> {
    match cli_config.input_csv {
        Some(ref path) => {
            let dataset = Dataset::from_csv_path(path)?;
            logging::log_dataset_loaded(path, dataset.len(), dataset.columns().len());
            Ok(dataset)
        }
        None => {
            let response = PolicyRequest::from_config(config).issue().await?;
            let dataset = response.into_dataset();
            logging::log_dataset_loaded(config.api_url(), dataset.len(), dataset.columns().len());
            Ok(dataset)
        }
    }
}

fn create_sink(cli_config: &CliConfig, config: &Config) -> Result<Box<dyn ResultSink>> {
    match cli_config.output_csv {
        Some(ref path) => Ok(Box::new(CsvSink::new(path))),
        None => Ok(Box::new(SheetsSink::from_config(config)?)),
    }
}

/// Progress bars only make sense on an interactive terminal.
fn create_progress_reporter(cli_config: &CliConfig) -> Option<ProgressReporter> {
    let interactive = atty::is(atty::Stream::Stderr);
    if interactive && !cli_config.quiet && !cli_config.no_progress {
        Some(ProgressReporter::new(true))
    } else {
        None
    }
}
