use std::sync::LazyLock;

use chrono::{Duration, Local, NaiveDate};
use regex::Regex;

use crate::models::AvailabilitySlot;

const MAX_SPOKEN_TIMES: usize = 10;

const NO_TIMES: &str = "I'm sorry, there are no available times for that date and party size. Would you like to try a different date?";

static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").expect("month-first pattern is valid")
});
static YEAR_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})[/.-]([0-9]{1,2})[/.-]([0-9]{1,2})$")
        .expect("year-first pattern is valid")
});
static TWELVE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2})(?::?([0-9]{2}))?\s*(am|pm)$").expect("12-hour pattern is valid")
});
static TWENTY_FOUR_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})(?::([0-9]{2}))?$").expect("24-hour pattern is valid")
});

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Canonical `YYYY-MM-DD` for a loosely formatted date, relative to the local
/// calendar. Unrecognised input is returned as given.
pub fn canonical_date(reference: &str) -> String {
    canonical_date_on(reference, today())
}

pub fn canonical_date_on(reference: &str, today: NaiveDate) -> String {
    let trimmed = reference.trim();
    match trimmed.to_lowercase().as_str() {
        "today" | "tonight" => return iso(today),
        "tomorrow" => return iso(today + Duration::days(1)),
        _ => {}
    }

    if let Some(caps) = MONTH_FIRST.captures(trimmed) {
        return format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[1], &caps[2]);
    }
    if let Some(caps) = YEAR_FIRST.captures(trimmed) {
        return format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]);
    }

    reference.to_string()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Converts `7pm` / `7:30 PM` to `19:00` / `19:30`. Anything else is taken to
/// be 24-hour already and only zero-padded (`9:30` -> `09:30`); input that is
/// not a clock time comes back unchanged.
pub fn canonical_time(reference: &str) -> String {
    let trimmed = reference.trim();

    if let Some(caps) = TWELVE_HOUR.captures(trimmed) {
        let hour: u32 = caps[1].parse().unwrap_or(0);
        let minute = caps.get(2).map_or("00", |m| m.as_str());
        let pm = caps[3].eq_ignore_ascii_case("pm");
        if (1..=12).contains(&hour) && minute < "60" {
            let hour = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            };
            return format!("{hour:02}:{minute}");
        }
        return reference.to_string();
    }

    // Bare hours are read on the 24-hour clock: "8" from "8 o'clock" is 08:00.
    // Booking submission needs HH:MM, and an evening hour has to be said as
    // "8 pm" or "20".
    if let Some(caps) = TWENTY_FOUR_HOUR.captures(trimmed) {
        let hour: u32 = caps[1].parse().unwrap_or(24);
        let minute = caps.get(2).map_or("00", |m| m.as_str());
        if hour < 24 && minute < "60" {
            return format!("{hour:02}:{minute}");
        }
    }

    reference.to_string()
}

/// "18:30" -> "6:30 PM". `None` for anything that is not `H:MM`.
pub fn spoken_time(time: &str) -> Option<String> {
    let mut parts = time.trim().split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute = parts.next()?;
    if hour > 23 || minute.len() != 2 || !minute.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    Some(format!("{display_hour}:{minute} {period}"))
}

/// Renders available slots as one spoken sentence.
pub fn speak_times(slots: &[AvailabilitySlot]) -> String {
    let mut times: Vec<String> = slots
        .iter()
        .filter_map(|slot| slot.time.as_deref().and_then(spoken_time))
        .take(MAX_SPOKEN_TIMES)
        .collect();

    match times.len() {
        0 => NO_TIMES.to_string(),
        1 => format!("I have {} available.", times[0]),
        2 => format!("I have {} and {} available.", times[0], times[1]),
        3..=5 => {
            let last = times.pop().unwrap_or_default();
            format!("I have {}, and {last} available.", times.join(", "))
        }
        n => format!(
            "I have several times available including {}, and {} more options. Which time works best for you?",
            times[..3].join(", "),
            n - 3
        ),
    }
}

/// "Friday, October 16, 2026"
pub fn spoken_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
