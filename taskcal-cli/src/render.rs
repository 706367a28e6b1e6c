//! Terminal rendering for taskcal types.

use chrono::{Datelike, Local, NaiveDate};
use owo_colors::OwoColorize;
use taskcal_core::date_key::{WEEKDAY_NAMES, build_month_grid, is_same_day};
use taskcal_core::{DateKey, Priority, SyncState, SyncStatus, Task, TaskCollection, YearMonth};

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for SyncStatus {
    fn render(&self) -> String {
        match self {
            SyncStatus::Local => "○ local only".dimmed().to_string(),
            SyncStatus::Cloud => "● synced".green().to_string(),
            SyncStatus::Error => "✕ sync error".red().to_string(),
        }
    }
}

impl Render for SyncState {
    fn render(&self) -> String {
        let mut line = self.status.render();

        if self.is_syncing() {
            line.push_str(&" (syncing)".yellow().to_string());
        }

        if let Some(time) = self.last_sync_time {
            let local = time.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            line.push_str(&format!("  last change {local}").dimmed().to_string());
        }

        line
    }
}

impl Render for Priority {
    fn render(&self) -> String {
        match self {
            Priority::High => "high".red().to_string(),
            Priority::Medium => "medium".yellow().to_string(),
            Priority::Low => "low".dimmed().to_string(),
        }
    }
}

impl Render for Task {
    fn render(&self) -> String {
        if self.completed {
            format!("{} {}", "[x]".green(), self.text.strikethrough().dimmed())
        } else {
            format!("[ ] {}  {}", self.text, self.priority.render())
        }
    }
}

/// Longest preview text shown under a month grid before cutting it short.
const PREVIEW_WIDTH: usize = 24;

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

/// Month grid, Sunday first, with today highlighted and a dot on days that
/// have tasks, followed by a short preview of each of those days.
pub fn render_month(month: YearMonth, tasks: &TaskCollection, today: NaiveDate) -> String {
    let mut lines = vec![format!("{:^28}", month.to_string()).bold().to_string()];

    let header: String = WEEKDAY_NAMES.iter().map(|name| format!("{name:>4}")).collect();
    lines.push(header.dimmed().to_string());

    let cells = build_month_grid(month);

    for week in cells.chunks(7) {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                None => "    ".to_string(),
                Some(day) => render_cell(*day, tasks, today),
            })
            .collect();
        lines.push(row);
    }

    let previews: Vec<String> = cells
        .iter()
        .flatten()
        .filter_map(|day| render_preview(*day, tasks))
        .collect();

    if !previews.is_empty() {
        lines.push(String::new());
        lines.extend(previews);
    }

    lines.join("\n")
}

fn render_cell(day: NaiveDate, tasks: &TaskCollection, today: NaiveDate) -> String {
    let has_tasks = !tasks.tasks_for(&DateKey::for_day(day)).is_empty();
    let marker = if has_tasks { "•" } else { " " };
    let cell = format!("{:>3}{}", day.day(), marker);

    if is_same_day(day, today) {
        cell.reversed().to_string()
    } else {
        cell
    }
}

fn render_preview(day: NaiveDate, tasks: &TaskCollection) -> Option<String> {
    let (shown, more) = tasks.preview(&DateKey::for_day(day));
    if shown.is_empty() {
        return None;
    }

    let weekday = WEEKDAY_NAMES[day.weekday().num_days_from_sunday() as usize];
    let texts: Vec<String> = shown.iter().map(|t| shorten(t, PREVIEW_WIDTH)).collect();
    let mut line = format!("{:>3} {}  {}", day.day(), weekday.dimmed(), texts.join(", "));

    if more > 0 {
        line.push_str(&format!(" +{more}").dimmed().to_string());
    }

    Some(line)
}

/// "3 task(s) on 2 day(s)"
pub fn render_task_summary(tasks: &TaskCollection) -> String {
    format!("{} task(s) on {} day(s)", tasks.len(), tasks.days().count())
}

/// Numbered task list for one day. Numbers start at 1.
pub fn render_day(day: NaiveDate, tasks: &[Task]) -> String {
    let mut lines = vec![day.format("%A %-d %B %Y").to_string().bold().to_string()];

    if tasks.is_empty() {
        lines.push("   No tasks".dimmed().to_string());
    }

    for (i, task) in tasks.iter().enumerate() {
        lines.push(format!("{:>3}. {}", i + 1, task.render()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskcal_core::NewTask;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_tasks(day: NaiveDate, texts: &[&str]) -> TaskCollection {
        texts.iter().fold(TaskCollection::new(), |tasks, text| {
            let task = NewTask::new(text, Priority::Medium)
                .unwrap()
                .into_task(chrono::Utc::now());
            tasks.with_added(DateKey::for_day(day), task)
        })
    }

    #[test]
    fn test_month_has_title_weekdays_and_every_day() {
        let march = YearMonth::new(2024, 3).unwrap();
        let out = render_month(march, &TaskCollection::new(), ymd(2000, 1, 1));

        assert!(out.contains("March 2024"));
        assert!(out.contains(" Sun Mon Tue Wed Thu Fri Sat"));
        assert!(out.contains(" 31 "));
        // March 2024 starts on a Friday: five blank cells before day 1.
        assert!(out.contains(&format!("{}  1 ", " ".repeat(20))));
    }

    #[test]
    fn test_month_previews_first_two_tasks_and_count() {
        let day = ymd(2024, 3, 15);
        let tasks = with_tasks(day, &["Buy milk", "Call mom", "Write report"]);
        let out = render_month(YearMonth::new(2024, 3).unwrap(), &tasks, ymd(2000, 1, 1));

        assert!(out.contains(" 15•"));
        assert!(out.contains("Buy milk, Call mom"));
        assert!(out.contains("+1"));
        assert!(!out.contains("Write report"));
    }

    #[test]
    fn test_day_lists_numbered_tasks() {
        let day = ymd(2024, 3, 15);
        let tasks = with_tasks(day, &["Buy milk", "Call mom"]);
        let out = render_day(day, tasks.tasks_for(&DateKey::for_day(day)));

        assert!(out.contains("Friday 15 March 2024"));
        assert!(out.contains("  1. [ ] Buy milk"));
        assert!(out.contains("  2. [ ] Call mom"));
    }

    #[test]
    fn test_summary_counts_tasks_and_days_separately() {
        let day = ymd(2024, 3, 15);
        let tasks = with_tasks(day, &["a", "b", "c"]);
        assert_eq!(render_task_summary(&tasks), "3 task(s) on 1 day(s)");

        let extra = tasks.tasks_for(&DateKey::for_day(day))[0].clone();
        let more = tasks.with_added(DateKey::for_day(ymd(2024, 3, 16)), extra);
        assert_eq!(render_task_summary(&more), "4 task(s) on 2 day(s)");
        assert_eq!(render_task_summary(&TaskCollection::new()), "0 task(s) on 0 day(s)");
    }

    #[test]
    fn test_empty_day() {
        assert!(render_day(ymd(2024, 3, 15), &[]).contains("No tasks"));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("a much longer text", 8), "a much …");
    }
}
