use anyhow::Result;
use chrono::NaiveDate;
use taskcal_core::DateKey;

use crate::App;
use crate::render::render_day;

pub fn run(app: &App, day: NaiveDate) -> Result<()> {
    let tasks = app.tasks_for(&DateKey::for_day(day));
    println!("{}", render_day(day, &tasks));
    Ok(())
}
