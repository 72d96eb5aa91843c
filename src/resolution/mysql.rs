//! MySQL resolution handlers
//!
//! Uses `YEAR()`, `MONTH()`, `DAYOFMONTH()` and `HOUR()`, all of which already
//! return canonical 1-based (0-based for hours) numbers. `DAYOFWEEK()` is
//! 1 = Sunday, so the weekly expressions subtract one before aligning to the
//! configured start day.

use super::epiweek::WeekStart;
use super::{kernel, ResolutionHandler, ResolutionUnit};
use crate::dialect::Dialect;
use chrono::NaiveDateTime;

/// MySQL handler for one resolution unit
#[derive(Debug, Clone)]
pub struct MysqlHandler {
    unit: ResolutionUnit,
    week_start: WeekStart,
}

impl MysqlHandler {
    /// Create a handler for `unit`
    pub fn new(unit: ResolutionUnit, week_start: WeekStart) -> Self {
        Self { unit, week_start }
    }

    fn convert(date_column: &str, timezone: Option<&str>) -> String {
        match timezone.filter(|tz| !tz.is_empty()) {
            Some(tz) => format!("CONVERT_TZ({}, @@session.time_zone, '{}')", date_column, tz),
            None => date_column.to_string(),
        }
    }

    /// Fourth day of the epi week containing `expr`
    fn week_midpoint(&self, expr: &str) -> String {
        format!(
            "DATE_ADD(DATE_SUB(DATE({e}), INTERVAL ((DAYOFWEEK({e}) + {shift}) % 7) DAY), INTERVAL 3 DAY)",
            e = expr,
            shift = 6 - self.week_start.day() as i64,
        )
    }
}

impl ResolutionHandler for MysqlHandler {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn category(&self) -> ResolutionUnit {
        self.unit
    }

    fn grouping_columns(&self, date_column: &str, timezone: Option<&str>) -> Vec<String> {
        let e = Self::convert(date_column, timezone);
        let year = format!("YEAR({})", e);
        let month = format!("MONTH({})", e);
        let day = format!("DAYOFMONTH({})", e);

        match self.unit {
            ResolutionUnit::Yearly => vec![year],
            ResolutionUnit::Monthly => vec![year, month],
            ResolutionUnit::Daily => vec![year, month, day],
            ResolutionUnit::Hourly => vec![year, month, day, format!("HOUR({})", e)],
            ResolutionUnit::Weekly => {
                let mid = self.week_midpoint(&e);
                vec![
                    format!("YEAR({})", mid),
                    format!("(DAYOFYEAR({}) - 1) DIV 7 + 1", mid),
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
