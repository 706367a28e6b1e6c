pub mod add;
pub mod day;
pub mod delete;
pub mod login;
pub mod logout;
pub mod month;
pub mod status;
pub mod sync;
pub mod toggle;

use crate::App;
use crate::render::Render;
use crate::utils::tui::with_spinner;

/// Wait for background pushes and report where the tasks ended up.
async fn settle_and_report(app: &mut App) {
    if app.has_remote() {
        with_spinner("Syncing...", app.settle()).await;
    }

    println!("{}", app.sync_state().render());
}
