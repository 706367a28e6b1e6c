use anyhow::Result;
use chrono::Local;
use taskcal_core::YearMonth;

use crate::App;
use crate::render::render_month;

/// Pick the month to show from the command line flags.
pub fn resolve(year: Option<i32>, month: Option<u32>, next: bool, prev: bool) -> Result<YearMonth> {
    resolve_from(YearMonth::current(), year, month, next, prev)
}

fn resolve_from(
    current: YearMonth,
    year: Option<i32>,
    month: Option<u32>,
    next: bool,
    prev: bool,
) -> Result<YearMonth> {
    match (year, month) {
        (Some(year), Some(month)) => YearMonth::new(year, month)
            .ok_or_else(|| anyhow::anyhow!("Invalid month {month}. Use a number from 1 to 12")),
        _ if next => Ok(current.next()),
        _ if prev => Ok(current.previous()),
        _ => Ok(current),
    }
}

pub fn run(app: &App, month: YearMonth) -> Result<()> {
    let today = Local::now().date_naive();
    println!("{}", render_month(month, &app.tasks(), today));
    Ok(())
}
