//! PostgreSQL resolution handlers
//!
//! `EXTRACT` returns numeric values, so every component is cast to INTEGER.
//! `EXTRACT(DOW ...)` is 0 = Sunday, matching the week-start numbering.
//! A timestamp column holds session-local wall time. It is first tagged with
//! the session zone, then rendered in the target zone, so the shift matches
//! MySQL's `CONVERT_TZ(col, @@session.time_zone, tz)`. Fixed offsets go
//! through `INTERVAL` because a bare `'+05:30'` literal is read with POSIX
//! (inverted) sign.

use super::epiweek::WeekStart;
use super::{kernel, ResolutionHandler, ResolutionUnit};
use crate::dialect::Dialect;
use chrono::NaiveDateTime;

/// PostgreSQL handler for one resolution unit
#[derive(Debug, Clone)]
pub struct PgsqlHandler {
    unit: ResolutionUnit,
    week_start: WeekStart,
}

impl PgsqlHandler {
    /// Create a handler for `unit`
    pub fn new(unit: ResolutionUnit, week_start: WeekStart) -> Self {
        Self { unit, week_start }
    }

    fn convert(date_column: &str, timezone: Option<&str>) -> String {
        let target = match timezone.filter(|tz| !tz.is_empty()) {
            Some(tz) if tz.starts_with(|c: char| c == '+' || c == '-') => {
                format!("INTERVAL '{}'", tz)
            }
            Some(tz) => format!("'{}'", tz),
            None => return date_column.to_string(),
        };
        format!(
            "(({} AT TIME ZONE current_setting('TimeZone')) AT TIME ZONE {})",
            date_column, target
        )
    }

    fn extract(field: &str, expr: &str) -> String {
        format!("CAST(EXTRACT({} FROM {}) AS INTEGER)", field, expr)
    }

    /// Fourth day of the epi week containing `expr`
    fn week_midpoint(&self, expr: &str) -> String {
        format!(
            "(CAST({e} AS DATE) - (CAST(EXTRACT(DOW FROM {e}) AS INTEGER) + {shift}) % 7 + 3)",
            e = expr,
            shift = 7 - self.week_start.day() as i64,
        )
    }
}

impl ResolutionHandler for PgsqlHandler {
    fn dialect(&self) -> Dialect {
        Dialect::Pgsql
    }

    fn category(&self) -> ResolutionUnit {
        self.unit
    }

    fn grouping_columns(&self, date_column: &str, timezone: Option<&str>) -> Vec<String> {
        let e = Self::convert(date_column, timezone);
        let year = Self::extract("YEAR", &e);
        let month = Self::extract("MONTH", &e);
        let day = Self::extract("DAY", &e);

        match self.unit {
            ResolutionUnit::Yearly => vec![year],
            ResolutionUnit::Monthly => vec![year, month],
            ResolutionUnit::Daily => vec![year, month, day],
            ResolutionUnit::Hourly => vec![year, month, day, Self::extract("HOUR", &e)],
            ResolutionUnit::Weekly => {
                let mid = self.week_midpoint(&e);
                vec![
                    Self::extract("YEAR", &mid),
                    format!("({} - 1) / 7 + 1", Self::extract("DOY", &mid)),
                ]
            }
        }
    }

    fn build_kernel(&self, raw: &[Option<i64>]) -> NaiveDateTime {
        kernel::build(self.unit, raw, self.week_start)
    }

    fn raw_values(&self, instant: NaiveDateTime) -> Vec<i64> {
        kernel::extract(self.unit, instant, self.week_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_columns() {
        let handler = PgsqlHandler::new(ResolutionUnit::Daily, WeekStart::SUNDAY);
        assert_eq!(
            handler.grouping_columns("visit_date", None),
            vec![
                "CAST(EXTRACT(YEAR FROM visit_date) AS INTEGER)",
                "CAST(EXTRACT(MONTH FROM visit_date) AS INTEGER)",
                "CAST(EXTRACT(DAY FROM visit_date) AS INTEGER)",
            ]
        );
    }

    #[test]
    fn test_timezone_conversion() {
        let handler = PgsqlHandler::new(ResolutionUnit::Yearly, WeekStart::SUNDAY);
        assert_eq!(
            handler.grouping_columns("visit_date", Some("+05:30")),
            vec![
                "CAST(EXTRACT(YEAR FROM ((visit_date AT TIME ZONE current_setting('TimeZone')) \
                 AT TIME ZONE INTERVAL '+05:30')) AS INTEGER)"
            ]
        );
        assert_eq!(
            handler.grouping_columns("visit_date", Some("Asia/Kolkata")),
            vec![
                "CAST(EXTRACT(YEAR FROM ((visit_date AT TIME ZONE current_setting('TimeZone')) \
                 AT TIME ZONE 'Asia/Kolkata')) AS INTEGER)"
            ]
        );
        // No timezone leaves the stored column untouched
        assert_eq!(
            handler.grouping_columns("visit_date", None),
            vec!["CAST(EXTRACT(YEAR FROM visit_date) AS INTEGER)"]
        );
    }

    #[test]
    fn test_weekly_columns() {
        let handler = PgsqlHandler::new(ResolutionUnit::Weekly, WeekStart::SUNDAY);
        let cols = handler.grouping_columns("d", None);
        assert_eq!(
            cols[0],
            "CAST(EXTRACT(YEAR FROM (CAST(d AS DATE) - (CAST(EXTRACT(DOW FROM d) AS INTEGER) + 7) % 7 + 3)) AS INTEGER)"
        );
        assert!(cols[1].starts_with("(CAST(EXTRACT(DOY FROM"));
    }

    #[test]
    fn test_monthly_kernel_is_first_of_month() {
        let handler = PgsqlHandler::new(ResolutionUnit::Monthly, WeekStart::SUNDAY);
        let kernel = handler.build_kernel(&[Some(2021), Some(3)]);
        assert_eq!(kernel.to_string(), "2021-03-01 00:00:00");
    }
}
