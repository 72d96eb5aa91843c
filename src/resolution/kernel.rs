//! Canonical bucket-start ("kernel") construction
//!
//! Raw grouped values arrive in the order a handler's grouping columns
//! produce them, already in canonical numbering: 1-based months and days,
//! 0-based hours, 1-based week numbers. Missing values fall back to the
//! smallest valid component (year 0, month 1, day 1, hour 0, week 1).

use super::epiweek::{self, WeekStart};
use super::ResolutionUnit;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Build the bucket start for `unit` from raw grouped values
pub fn build(unit: ResolutionUnit, raw: &[Option<i64>], week_start: WeekStart) -> NaiveDateTime {
    let at = |i: usize| raw.get(i).copied().flatten();
    let year = clamp_year(at(0).unwrap_or(0));

    match unit {
        ResolutionUnit::Yearly => midnight(date_or_floor(year, 1, 1)),
        ResolutionUnit::Monthly => midnight(date_or_floor(year, month(at(1)), 1)),
        ResolutionUnit::Daily => {
            let m = month(at(1));
            midnight(date_or_floor(year, m, day(year, m, at(2))))
        }
        ResolutionUnit::Hourly => {
            let m = month(at(1));
            let date = date_or_floor(year, m, day(year, m, at(2)));
            let hour = at(3).unwrap_or(0).clamp(0, 23) as u32;
            date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
        }
        ResolutionUnit::Weekly => {
            let week = at(1).unwrap_or(1).clamp(1, 53);
            let date = epiweek::week_start_date(week_start, year, week)
                .unwrap_or_else(|| date_or_floor(year, 1, 1));
            midnight(date)
        }
    }
}

/// In-memory evaluation of a unit's grouping columns for one instant
pub fn extract(unit: ResolutionUnit, instant: NaiveDateTime, week_start: WeekStart) -> Vec<i64> {
    let date = instant.date();
    match unit {
        ResolutionUnit::Yearly => vec![date.year() as i64],
        ResolutionUnit::Monthly => vec![date.year() as i64, date.month() as i64],
        ResolutionUnit::Daily => vec![
            date.year() as i64,
            date.month() as i64,
            date.day() as i64,
        ],
        ResolutionUnit::Hourly => vec![
            date.year() as i64,
            date.month() as i64,
            date.day() as i64,
            instant.hour() as i64,
        ],
        ResolutionUnit::Weekly => vec![
            epiweek::week_year(week_start, date) as i64,
            epiweek::week_of_year(week_start, date) as i64,
        ],
    }
}

/// Truncate an instant to the start of its bucket
pub fn truncate(unit: ResolutionUnit, instant: NaiveDateTime, week_start: WeekStart) -> NaiveDateTime {
    let date = instant.date();
    match unit {
        ResolutionUnit::Yearly => midnight(date_or_floor(date.year(), 1, 1)),
        ResolutionUnit::Monthly => midnight(date_or_floor(date.year(), date.month(), 1)),
        ResolutionUnit::Daily => midnight(date),
        ResolutionUnit::Hourly => date.and_time(
            NaiveTime::from_hms_opt(instant.hour(), 0, 0).unwrap_or(NaiveTime::MIN),
        ),
        ResolutionUnit::Weekly => {
            midnight(epiweek::first_day_of_week(week_start, date).unwrap_or(date))
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn clamp_year(year: i64) -> i32 {
    // Stay well inside chrono's representable range
    year.clamp(-200_000, 200_000) as i32
}

fn month(raw: Option<i64>) -> u32 {
    raw.unwrap_or(1).clamp(1, 12) as u32
}

fn day(year: i32, month: u32, raw: Option<i64>) -> u32 {
    let last = days_in_month(year, month);
    raw.unwrap_or(1).clamp(1, last as i64) as u32
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn date_or_floor(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(0, 1, 1))
        .unwrap_or(NaiveDate::MIN)
}
