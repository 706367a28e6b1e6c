use anyhow::Result;
use owo_colors::OwoColorize;

use crate::App;
use crate::render::{Render, render_task_summary};
use crate::utils::tui::with_spinner;

/// The remembered user's tasks were already loaded on startup; this runs the
/// load protocol once more and reports the outcome.
pub async fn run(app: &mut App) -> Result<()> {
    if !app.has_remote() {
        println!(
            "{}",
            "No [remote] configured in config.toml, tasks stay on this device.".dimmed()
        );
        return Ok(());
    }

    with_spinner("Syncing...", app.manual_sync()).await?;

    println!(
        "{}  {}",
        render_task_summary(&app.tasks()),
        app.sync_state().render()
    );

    Ok(())
}
