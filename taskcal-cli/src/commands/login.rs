use anyhow::Result;
use owo_colors::OwoColorize;

use crate::App;
use crate::render::{Render, render_task_summary};
use crate::utils::tui::with_spinner;

pub async fn run(app: &mut App, email: &str) -> Result<()> {
    let user = if app.has_remote() {
        with_spinner("Loading tasks...", app.initialize(email)).await?
    } else {
        app.initialize(email).await?
    };

    println!("Logged in as {}", user.email.bold());
    println!(
        "{}",
        "There is no password: anyone using this email sees the same tasks.".dimmed()
    );
    println!(
        "{}, {}",
        render_task_summary(&app.tasks()),
        app.sync_state().render()
    );

    Ok(())
}
