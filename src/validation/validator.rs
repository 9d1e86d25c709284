use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::core::constants::{columns, defaults, network, timeouts};
use crate::core::{Dataset, Result};
use crate::reporting::logging;
use crate::ui::ProgressReporter;
use crate::validation::checker::{HttpProbe, ReqwestProbe, UrlChecker};
use crate::validation::extract::{IgnoreList, extract_urls};

/// Knobs for a validation run.
#[derive(Debug, Clone)]
pub struct ValidatorSettings {
    pub row_timeout: Duration,
    pub url_timeout: Duration,
    pub ignore_empty: bool,
    pub ignore_list: IgnoreList,
    pub user_agent: String,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            row_timeout: Duration::from_secs(timeouts::DEFAULT_ROW_TIMEOUT_SECONDS),
            url_timeout: Duration::from_secs(timeouts::DEFAULT_URL_TIMEOUT_SECONDS),
            ignore_empty: defaults::IGNORE_EMPTY,
            ignore_list: IgnoreList::new(defaults::IGNORED_URLS),
            user_agent: network::BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl ValidatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            row_timeout: config.row_timeout_duration(),
            url_timeout: config.url_timeout_duration(),
            ignore_empty: config.ignore_empty(),
            ignore_list: IgnoreList::new(config.ignored_urls()),
            user_agent: config.user_agent().to_string(),
        }
    }
}

/// What happened to one row's reference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVerdict {
    /// Empty field skipped because empty references are tolerated.
    SkippedEmpty,
    /// Whole field, or every token in it, is on the ignore list.
    Ignored,
    /// Every URL answered acceptably.
    Passed,
    /// At least one URL is malformed, unreachable or returned an error
    /// status, or the field is empty.
    Flagged,
    /// The check produced no answer within the row budget or crashed.
    Indeterminate,
}

impl RowVerdict {
    pub fn is_flagged(self) -> bool {
        matches!(self, RowVerdict::Flagged | RowVerdict::Indeterminate)
    }
}

/// Verdicts for a dataset plus the flagged subset.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    flagged: Dataset,
    verdicts: Vec<RowVerdict>,
}

impl ValidationReport {
    pub fn new(dataset: &Dataset, verdicts: Vec<RowVerdict>) -> Self {
        let mask: Vec<bool> = verdicts.iter().map(|verdict| verdict.is_flagged()).collect();
        Self {
            flagged: dataset.select(&mask),
            verdicts,
        }
    }

    pub fn flagged(&self) -> &Dataset {
        &self.flagged
    }

    pub fn into_flagged(self) -> Dataset {
        self.flagged
    }

    pub fn verdicts(&self) -> &[RowVerdict] {
        &self.verdicts
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    pub fn indeterminate_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|verdict| **verdict == RowVerdict::Indeterminate)
            .count()
    }
}

/// Slot where a row task deposits its answer, keyed by field text.
///
/// Each row gets a fresh board. A task that is aborted or panics never
/// writes, so the orchestrator sees an absent entry.
#[derive(Debug, Clone, Default)]
struct ResultBoard {
    entries: Arc<Mutex<FxHashMap<String, bool>>>,
}

impl ResultBoard {
    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, bool>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn report(&self, key: String, flagged: bool) {
        self.lock().insert(key, flagged);
    }

    fn take(&self, key: &str) -> Option<bool> {
        self.lock().remove(key)
    }
}

/// Flags dataset rows whose `reference` field is broken.
///
/// Rows are processed one after another. Each row's URL checks run on their
/// own task under the row budget; the task is always aborted afterwards, so
/// nothing from a row outlives its turn.
pub struct ReferenceValidator {
    settings: ValidatorSettings,
    checker: UrlChecker,
}

impl ReferenceValidator {
    /// Validator backed by a real HTTP client.
    pub fn new(settings: ValidatorSettings) -> Result<Self> {
        let probe = ReqwestProbe::new(&settings.user_agent)?;
        Ok(Self::with_probe(settings, Arc::new(probe)))
    }

    pub fn with_probe(settings: ValidatorSettings, probe: Arc<dyn HttpProbe>) -> Self {
        let checker = UrlChecker::new(probe, settings.url_timeout);
        Self { settings, checker }
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Decide whether one reference field should be flagged.
    pub async fn assess_field(&self, field: &str) -> RowVerdict {
        if field.is_empty() && self.settings.ignore_empty {
            return RowVerdict::SkippedEmpty;
        }

        let tokens = extract_urls(field);
        if tokens.is_empty() {
            return RowVerdict::Flagged;
        }

        if self.settings.ignore_list.contains(field.trim()) {
            return RowVerdict::Ignored;
        }

        let tokens: Vec<String> = tokens
            .into_iter()
            .filter(|token| !self.settings.ignore_list.contains(token))
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            return RowVerdict::Ignored;
        }

        let board = ResultBoard::default();
        let mut handle = self.spawn_check(field, tokens, &board);

        let finished = tokio::time::timeout(self.settings.row_timeout, &mut handle).await;
        handle.abort();

        match board.take(field) {
            Some(true) => RowVerdict::Flagged,
            Some(false) => RowVerdict::Passed,
            None => {
                match finished {
                    Err(_) => logging::log_warning(&format!(
                        "Reference check exceeded {:?}: {field:?}",
                        self.settings.row_timeout
                    )),
                    Ok(Err(join_error)) => logging::log_error(
                        &format!("Reference check crashed for {field:?}"),
                        Some(&join_error),
                    ),
                    Ok(Ok(())) => {}
                }
                RowVerdict::Indeterminate
            }
        }
    }

    /// Start checking `tokens` on their own task; the answer lands on `board`
    /// under the whole field text.
    fn spawn_check(&self, field: &str, tokens: Vec<String>, board: &ResultBoard) -> JoinHandle<()> {
        let checker = self.checker.clone();
        let board = board.clone();
        let key = field.to_string();
        tokio::spawn(async move {
            let flagged = checker.any_flagged(&tokens).await;
            board.report(key, flagged);
        })
    }

    /// Assess every row of `dataset` in order.
    ///
    /// Fails only when the dataset has no `reference` column.
    pub async fn assess(
        &self,
        dataset: &Dataset,
        mut progress: Option<&mut ProgressReporter>,
    ) -> Result<ValidationReport> {
        let reference = dataset.require_column(columns::REFERENCE)?;
        let start = Instant::now();
        logging::log_validation_start(dataset.len());

        if let Some(ref mut progress) = progress {
            progress.start_row_validation(dataset.len());
        }

        let mut verdicts = Vec::with_capacity(dataset.len());
        let mut flagged = 0;
        for (index, record) in dataset.records().iter().enumerate() {
            let field = record.get(reference);
            let verdict = self.assess_field(field).await;
            logging::log_row_verdict(index + 1, field, verdict);

            if verdict.is_flagged() {
                flagged += 1;
            }
            if verdict == RowVerdict::Indeterminate
                && let Some(ref progress) = progress
            {
                progress.log_warning(&format!("Row {} did not finish checking", index + 1));
            }
            if let Some(ref progress) = progress {
                progress.update_row_progress(index + 1, flagged);
            }
            verdicts.push(verdict);
        }

        if let Some(ref progress) = progress {
            progress.finish_row_validation(flagged, dataset.len());
        }

        let report = ValidationReport::new(dataset, verdicts);
        logging::log_validation_complete(&report, start.elapsed().as_millis());
        Ok(report)
    }

    /// Rows of `dataset` with a broken reference, in input order.
    pub async fn detect_invalid_references(&self, dataset: &Dataset) -> Result<Dataset> {
        Ok(self.assess(dataset, None).await?.into_flagged())
    }
}
