use eonet::sync::LoadProgress;

/// Logging display using tracing for structured output.
pub struct LoggingDisplay;

impl LoggingDisplay {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: &LoadProgress) {
        match event {
            LoadProgress::CategoriesLoaded { count } => {
                tracing::info!(count, "Categories loaded");
            }

            LoadProgress::FetchedEvents { category_id, count } => {
                tracing::debug!(category = %category_id, count, "Fetched events");
            }

            LoadProgress::Folded {
                completed,
                total,
                attached,
                ..
            } => {
                tracing::debug!(completed, total, attached, "Folded batch");
            }

            LoadProgress::Complete {
                completed,
                total,
                events,
                cancelled,
            } => {
                if *cancelled {
                    tracing::warn!(completed, total, events, "Download cancelled");
                } else {
                    tracing::info!(total, events, "Download complete");
                }
            }

            LoadProgress::Warning { message } => {
                tracing::warn!("{}", message);
            }

            _ => {}
        }
    }

    pub fn set_progress(&self, completed: usize, total: usize, percent: u8) {
        tracing::info!(completed, total, "Download: {}%", percent);
    }

    pub fn finish(&self) {
        tracing::debug!("Progress finished");
    }
}

impl Default for LoggingDisplay {
    fn default() -> Self {
        Self::new()
    }
}
