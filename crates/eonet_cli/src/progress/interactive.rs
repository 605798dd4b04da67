use console::style;
use eonet::sync::LoadProgress;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Interactive progress display using indicatif.
///
/// A single bar measured in percent. Per-category detail goes in the
/// message, warnings are printed above the bar.
pub struct InteractiveDisplay {
    bar: ProgressBar,
}

impl InteractiveDisplay {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(100))
    }

    /// A display that draws nowhere.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::with_draw_target(
            Some(100),
            ProgressDrawTarget::hidden(),
        ))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(Self::bar_style());
        bar.set_prefix("Download:");
        bar.set_message("Loading categories...");
        bar.set_position(0);
        Self { bar }
    }

    pub fn handle(&self, event: &LoadProgress) {
        match event {
            LoadProgress::CategoriesLoaded { count } => {
                self.bar.set_message(format!("{} categories", count));
            }
            LoadProgress::FetchedEvents { category_id, count } => {
                self.bar
                    .set_message(format!("{}: {} events", category_id, count));
            }
            LoadProgress::Warning { message } => {
                self.bar
                    .println(format!("{} {}", style("⚠").yellow(), message));
            }
            LoadProgress::Complete {
                events, cancelled, ..
            } => {
                let msg = if *cancelled {
                    format!("cancelled ({} events)", events)
                } else {
                    format!("{} events", events)
                };
                self.bar.set_message(msg);
            }
            _ => {}
        }
    }

    pub fn set_progress(&self, _completed: usize, _total: usize, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish();
        }
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} {pos:>3}% [{bar:40.cyan/blue}] {msg}")
            .expect("Invalid template")
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveDisplay {
    fn default() -> Self {
        Self::new()
    }
}
