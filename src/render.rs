//! Terminal rendering for daygrid state.
//!
//! Everything here is a pure projection: the same state always produces
//! the same output, and nothing is mutated. State changes go through the
//! sync controller, after which callers simply render again.

use chrono::{Datelike, NaiveDate};
use daygrid_core::AppState;
use daygrid_core::datekey::{self, DateKey};
use owo_colors::OwoColorize;

/// Width of one day cell in the month grid, including the gap.
const CELL_WIDTH: usize = 16;
/// Preview lines shown per day cell.
const PREVIEW_LINES: usize = 2;

/// Persistent banner shown whenever the backend was last seen unreachable.
pub fn offline_banner() -> String {
    "offline: changes may not reach other devices"
        .yellow()
        .to_string()
}

/// Render the month grid for the month containing `first_of_month`.
///
/// Weeks start on Sunday; the leading blank cells come from the weekday of
/// the first day. Each day cell shows the day number, a today marker, and
/// up to two hour previews in ascending hour order.
pub fn month_grid(state: &AppState, first_of_month: NaiveDate, today: NaiveDate) -> String {
    let days = days_in_month(first_of_month);
    let lead = first_of_month.weekday().num_days_from_sunday() as usize;

    let mut cells: Vec<Option<u32>> = Vec::with_capacity(lead + days as usize);
    cells.extend(std::iter::repeat_n(None, lead));
    cells.extend((1..=days).map(Some));
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    let mut lines = Vec::new();

    if !state.online {
        lines.push(offline_banner());
        lines.push(String::new());
    }

    let title = first_of_month.format("%B %Y").to_string();
    lines.push(format!("{title:^width$}", width = CELL_WIDTH * 7).bold().to_string());
    lines.push(weekday_header());

    for week in cells.chunks(7) {
        lines.push(String::new());
        lines.push(week_number_line(state, week, first_of_month, today));
        for row in 0..PREVIEW_LINES {
            lines.push(week_preview_line(state, week, first_of_month, row));
        }
    }

    lines.join("\n")
}

/// Render the fixed 16-slot view of one day, blank slots included.
pub fn day_view(state: &AppState, date_key: &DateKey) -> String {
    let mut lines = Vec::new();

    if !state.online {
        lines.push(offline_banner());
        lines.push(String::new());
    }

    let heading = date_key.date().format("%A, %B %-d %Y").to_string();
    lines.push(heading.bold().to_string());
    lines.push(String::new());

    for hour in datekey::day_hours() {
        let label = datekey::hour_label(hour);
        match state.events.get(date_key, hour) {
            Some(text) => lines.push(format!("  {:>5}  {}", label.dimmed(), text)),
            None => lines.push(format!("  {:>5}", label.dimmed())),
        }
    }

    lines.join("\n")
}

fn weekday_header() -> String {
    let mut header = String::new();
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        header.push_str(&pad(name, CELL_WIDTH));
    }
    header.dimmed().to_string()
}

fn week_number_line(
    state: &AppState,
    week: &[Option<u32>],
    first_of_month: NaiveDate,
    today: NaiveDate,
) -> String {
    let mut line = String::new();
    for cell in week {
        match cell {
            None => line.push_str(&pad("", CELL_WIDTH)),
            Some(day) => {
                // unwrap safe: `day` came from this month's day range
                let date = first_of_month.with_day(*day).unwrap();
                let marker = if date == today { "*" } else { " " };
                let cell_text = pad(&format!("{day:>2}{marker}"), CELL_WIDTH);
                if date == today {
                    line.push_str(&cell_text.bold().to_string());
                } else if state.events.has_events(&DateKey::new(date)) {
                    line.push_str(&cell_text.cyan().to_string());
                } else {
                    line.push_str(&cell_text);
                }
            }
        }
    }
    line
}

fn week_preview_line(
    state: &AppState,
    week: &[Option<u32>],
    first_of_month: NaiveDate,
    row: usize,
) -> String {
    let mut line = String::new();
    for cell in week {
        match cell {
            None => line.push_str(&pad("", CELL_WIDTH)),
            Some(day) => {
                // unwrap safe: `day` came from this month's day range
                let date = first_of_month.with_day(*day).unwrap();
                let preview = state.events.preview(&DateKey::new(date), PREVIEW_LINES);
                match preview.get(row) {
                    Some((hour, text)) => {
                        let entry =
                            format!(" {} {}", datekey::hour_label_compact(*hour), text);
                        line.push_str(&pad(&entry, CELL_WIDTH));
                    }
                    None => line.push_str(&pad("", CELL_WIDTH)),
                }
            }
        }
    }
    line.trim_end().to_string()
}

/// Left-pad to the cell width, truncating long text so columns line up.
/// Padding happens before any color is applied.
fn pad(s: &str, width: usize) -> String {
    let truncated: String = s.chars().take(width - 1).collect();
    format!("{truncated:<width$}")
}

fn days_in_month(first_of_month: NaiveDate) -> u32 {
    let (year, month) = (first_of_month.year(), first_of_month.month());
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // unwrap safe: the first of the next month always exists
    next_month.unwrap().pred_opt().unwrap().day()
}
