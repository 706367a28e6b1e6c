use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use taskcal_core::DateKey;

use super::settle_and_report;
use crate::App;

pub async fn run(app: &mut App, day: NaiveDate, index: usize) -> Result<()> {
    let removed = app.delete_task(DateKey::for_day(day), index)?;

    println!("Deleted from {}: {}", day, removed.text.red());
    settle_and_report(app).await;

    Ok(())
}
