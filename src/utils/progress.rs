//! Progress bar utilities using indicatif

use indicatif::{ProgressBar as IndicatifBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar for per-item lookups, drawn on stderr
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Create a new progress bar with known total
    pub fn new(total: usize, label: &str) -> Self {
        let bar = IndicatifBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} {eta}")
        {
            bar.set_style(style.progress_chars("█░"));
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// Progress bar that never draws (used with `--quiet`)
    pub fn hidden() -> Self {
        Self {
            bar: IndicatifBar::hidden(),
        }
    }

    /// Increment progress by 1
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Finish with custom message
    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Print a message above the progress bar without disturbing it
    pub fn println<S: AsRef<str>>(&self, msg: S) {
        self.bar.println(msg.as_ref());
    }
}
