//! Progress reporting for batch reprocessing
//!
//! [`ReprocessProgress`] turns the `(kind, done, total)` callbacks of the
//! update driver into one progress bar per store kind.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Progress reporter fed by the update driver's observer callback
pub struct ReprocessProgress {
    visible: bool,
    current: Option<(String, ProgressBar)>,
    completed_kinds: Vec<String>,
}

impl ReprocessProgress {
    pub fn new() -> Self {
        Self {
            visible: true,
            current: None,
            completed_kinds: Vec::new(),
        }
    }

    /// A reporter that tracks progress without drawing
    pub fn hidden() -> Self {
        Self {
            visible: false,
            current: None,
            completed_kinds: Vec::new(),
        }
    }

    /// Record that `done` of `total` stores of `kind` have been processed
    pub fn observe(&mut self, kind: &str, done: usize, total: usize) {
        let switching = self
            .current
            .as_ref()
            .is_none_or(|(current_kind, _)| current_kind != kind);
        if switching {
            self.finish_current();
            let pb = if self.visible {
                ProgressBar::new(total as u64)
            } else {
                ProgressBar::hidden()
            };
            pb.set_length(total as u64);
            pb.set_style(bar_style());
            pb.set_message(format!("Updating all {} stores", kind));
            debug!("Progress bar initialized for {} {} stores", total, kind);
            self.current = Some((kind.to_string(), pb));
        }

        if let Some((_, pb)) = &self.current {
            pb.set_position(done as u64);
        }
    }

    /// Kind currently being reported, if any
    pub fn current_kind(&self) -> Option<&str> {
        self.current.as_ref().map(|(kind, _)| kind.as_str())
    }

    pub fn current_position(&self) -> u64 {
        self.current.as_ref().map_or(0, |(_, pb)| pb.position())
    }

    /// Kinds whose bars have been finished
    pub fn completed_kinds(&self) -> &[String] {
        &self.completed_kinds
    }

    pub fn finish(&mut self) {
        self.finish_current();
    }

    fn finish_current(&mut self) {
        if let Some((kind, pb)) = self.current.take() {
            pb.finish_with_message(format!("Updated {} {} stores", pb.position(), kind));
            self.completed_kinds.push(kind);
        }
    }
}

impl Default for ReprocessProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReprocessProgress {
    fn drop(&mut self) {
        if let Some((_, pb)) = &self.current
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
    }
}

/// Spinner for operations without a known length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .map(|style| style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
