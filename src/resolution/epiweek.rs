//! Epidemiological week arithmetic
//!
//! Weeks start on a configurable day (0 = Sunday .. 6 = Saturday). Days are
//! numbered absolutely from the common era, shifted so that every aligned
//! block of seven starts on the chosen day; an absolute week number is the
//! floor of that count divided by seven.
//!
//! A week belongs to the calendar year containing its fourth day, so week 1
//! of a week-year is the week containing January 4th. With a Monday start
//! this coincides with ISO-8601 week numbering; with a Sunday start it is the
//! CDC MMWR convention.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// First day of an epidemiological week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekStart(u8);

impl WeekStart {
    /// Weeks start on Sunday
    pub const SUNDAY: WeekStart = WeekStart(0);
    /// Weeks start on Monday
    pub const MONDAY: WeekStart = WeekStart(1);

    /// Create from a day number, 0 = Sunday .. 6 = Saturday
    pub fn new(day: u8) -> Option<Self> {
        (day < 7).then_some(Self(day))
    }

    /// Create from a chrono weekday
    pub fn from_weekday(weekday: Weekday) -> Self {
        Self(weekday.num_days_from_sunday() as u8)
    }

    /// Day number, 0 = Sunday
    pub fn day(&self) -> u8 {
        self.0
    }

    /// As a chrono weekday
    pub fn weekday(&self) -> Weekday {
        match self.0 {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }

    /// Shift that aligns absolute day numbers to this start day
    fn offset(&self) -> i64 {
        7 - self.0 as i64
    }
}

impl Default for WeekStart {
    fn default() -> Self {
        Self::SUNDAY
    }
}

impl TryFrom<u8> for WeekStart {
    type Error = String;

    fn try_from(day: u8) -> Result<Self, Self::Error> {
        Self::new(day).ok_or_else(|| format!("week start day must be 0..=6, got {}", day))
    }
}

impl From<WeekStart> for u8 {
    fn from(ws: WeekStart) -> u8 {
        ws.0
    }
}

/// Absolute week number of a date
pub fn absolute_week(start: WeekStart, date: NaiveDate) -> i64 {
    (date.num_days_from_ce() as i64 + start.offset()).div_euclid(7)
}

/// First day of an absolute week
fn absolute_week_start(start: WeekStart, week: i64) -> Option<NaiveDate> {
    let days = week * 7 - start.offset();
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// First day of the week containing `date`
pub fn first_day_of_week(start: WeekStart, date: NaiveDate) -> Option<NaiveDate> {
    absolute_week_start(start, absolute_week(start, date))
}

/// Week-year of a date; may differ from its calendar year near January 1st
pub fn week_year(start: WeekStart, date: NaiveDate) -> i32 {
    absolute_week_start(start, absolute_week(start, date))
        .and_then(|first| first.checked_add_days(chrono::Days::new(3)))
        .map(|fourth| fourth.year())
        .unwrap_or_else(|| date.year())
}

/// 1-based week number of a date within its week-year
pub fn week_of_year(start: WeekStart, date: NaiveDate) -> u32 {
    let year = week_year(start, date);
    match NaiveDate::from_ymd_opt(year, 1, 4) {
        Some(anchor) => (absolute_week(start, date) - absolute_week(start, anchor) + 1) as u32,
        None => 1,
    }
}

/// First day of week `week` of `week_year`
pub fn week_start_date(start: WeekStart, week_year: i32, week: i64) -> Option<NaiveDate> {
    let anchor = NaiveDate::from_ymd_opt(week_year, 1, 4)?;
    absolute_week_start(start, absolute_week(start, anchor) + week - 1)
}
