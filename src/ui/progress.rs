use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Row-level progress bar for a validation run.
///
/// Every method is a no-op when the reporter is disabled, so callers never
/// have to check.
pub struct ProgressReporter {
    row_progress: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            row_progress: None,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_row_validation(&mut self, total_rows: usize) {
        if !self.enabled {
            return;
        }

        let pb = ProgressBar::new(total_rows as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.yellow/red}] {pos}/{len} rows checked, {msg} ({eta})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("0 flagged");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.row_progress = Some(pb);
    }

    pub fn update_row_progress(&self, current: usize, flagged: usize) {
        if let Some(ref pb) = self.row_progress {
            pb.set_position(current as u64);
            pb.set_message(format!("{flagged} flagged"));
        }
    }

    pub fn finish_row_validation(&self, flagged: usize, total: usize) {
        if let Some(ref pb) = self.row_progress {
            let message = if flagged == 0 {
                "✓ No broken references".to_string()
            } else {
                format!("✓ Validation complete ({flagged}/{total} flagged)")
            };
            pb.finish_with_message(message);
        }
    }

    pub fn log_warning(&self, message: &str) {
        if let Some(ref pb) = self.row_progress {
            pb.println(format!("⚠ {message}"));
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(ref pb) = self.row_progress {
            pb.finish_and_clear();
        }
    }
}
