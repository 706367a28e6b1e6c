use anyhow::Result;
use owo_colors::OwoColorize;
use taskcal_core::TaskRemote;

use crate::App;
use crate::render::{Render, render_task_summary};
use crate::utils::tui::with_spinner;

pub async fn run(app: &mut App) -> Result<()> {
    match app.remote() {
        None => println!("Remote: {}", "not configured, tasks stay on this device".dimmed()),
        Some(remote) => match with_spinner("Checking remote...", remote.check_connection()).await {
            Ok(()) => println!("Remote: {}", "reachable".green()),
            Err(e) => println!("Remote: {}", e.to_string().red()),
        },
    }

    if app.remembered_user().is_none() {
        println!("Not logged in. Run `taskcal login <email>` to start.");
        return Ok(());
    }

    let user = if app.has_remote() {
        with_spinner("Loading tasks...", app.resume()).await
    } else {
        app.resume().await
    };

    if let Some(user) = user {
        println!("User:   {}", user.email.bold());
        println!("Tasks:  {}", render_task_summary(&app.tasks()));
        println!("Sync:   {}", app.sync_state().render());
    }

    Ok(())
}
