use anyhow::Result;
use chrono::NaiveDate;
use taskcal_core::{DateKey, NewTask, Priority};

use super::settle_and_report;
use crate::App;
use crate::render::Render;

pub async fn run(app: &mut App, day: NaiveDate, text: &str, priority: Priority) -> Result<()> {
    let new_task = NewTask::new(text, priority)?;
    let task = app.add_task(DateKey::for_day(day), new_task)?;

    println!("Added to {}: {}", day, task.render());
    settle_and_report(app).await;

    Ok(())
}
