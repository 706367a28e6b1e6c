use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &[&str] = &["-", "\\", "|", "/"];

/// Spinner shown while waiting on the remote store. Draws to stderr, so it
/// stays out of piped output.
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template("{msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run `future` behind a spinner, clearing it when done.
pub async fn with_spinner<F: Future>(message: &str, future: F) -> F::Output {
    let spinner = create_spinner(message.to_string());
    let output = future.await;
    spinner.finish_and_clear();
    output
}
