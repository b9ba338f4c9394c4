use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a catalog request is in flight.
///
/// Falls back to structured log lines when not attached to a terminal.
pub struct FetchSpinner {
    spinner: Option<ProgressBar>,
}

impl FetchSpinner {
    pub fn start(message: &str, enabled: bool) -> Self {
        if !enabled || !is_interactive() {
            tracing::info!(operation = "progress", message = %message, "Progress update");
            return Self { spinner: None };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
        {
            spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        Self { spinner: Some(spinner) }
    }

    pub fn set_message(&self, msg: String) {
        match &self.spinner {
            Some(spinner) => spinner.set_message(msg),
            None => tracing::info!(operation = "progress", message = %msg, "Progress update"),
        }
    }

    pub fn finish(self) {
        if let Some(spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
