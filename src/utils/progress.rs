// src/utils/progress.rs
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}";

/// Stacked terminal progress bars (one per day, one per document batch).
///
/// Bars draw to stderr and hide themselves when stderr is not a terminal.
/// Log lines emitted while bars are live go through [`Progress::suspend`]
/// so a bar is never torn by a warning.
pub struct Progress {
    bars: MultiProgress,
}

impl Progress {
    pub fn new() -> Self {
        Self { bars: MultiProgress::new() }
    }

    /// Never draws; used by tests.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            bars: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
        }
    }

    pub fn bar(&self, len: usize, prefix: impl Into<String>) -> ProgressBar {
        let pb = self.bars.add(ProgressBar::new(len as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_prefix(prefix.into());
        pb
    }

    /// Runs `f` with every bar cleared from the terminal, then redraws.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bars.suspend(f)
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}
