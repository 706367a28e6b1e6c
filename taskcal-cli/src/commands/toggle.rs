use anyhow::Result;
use chrono::NaiveDate;
use taskcal_core::DateKey;

use super::settle_and_report;
use crate::App;
use crate::render::Render;

pub async fn run(app: &mut App, day: NaiveDate, index: usize) -> Result<()> {
    let task = app.toggle_task(DateKey::for_day(day), index)?;

    let verb = if task.completed { "Done" } else { "Reopened" };
    println!("{verb}: {}", task.render());
    settle_and_report(app).await;

    Ok(())
}
