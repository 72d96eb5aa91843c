//! Series query requests
//!
//! A [`SeriesQueryRequest`] bundles everything one series query needs and is
//! threaded unchanged through validation, planning and assembly.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use seriesql::dialect::Dialect;
//! use seriesql::filter::Filter;
//! use seriesql::resolution::ResolutionUnit;
//! use seriesql::series::{DateRange, SeriesQueryRequest};
//!
//! let range = DateRange::days(
//!     NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2013, 12, 31).unwrap(),
//! );
//! let request = SeriesQueryRequest::builder("cases", range)
//!     .dialect(Dialect::Mysql)
//!     .resolution(ResolutionUnit::Weekly)
//!     .group_by("region")
//!     .filter(Filter::eq("sex", "F"))
//!     .build();
//!
//! assert_eq!(request.grouping, vec!["region"]);
//! ```

use super::AggregateFunction;
use crate::dialect::Dialect;
use crate::filter::Filter;
use crate::resolution::ResolutionUnit;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Inclusive timestamp range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First instant included
    pub start: NaiveDateTime,
    /// Last instant included
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Create from instants
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole days from `first` through `last`
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        let end_of_day =
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            start: first.and_time(NaiveTime::MIN),
            end: last.and_time(end_of_day),
        }
    }

    /// Whether start does not follow end
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

/// A series query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesQueryRequest {
    /// Filters, in request order
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Bounds on the date dimension
    pub date_range: DateRange,
    /// Bucket size
    pub resolution: ResolutionUnit,
    /// Target backend
    pub dialect: Dialect,
    /// Dimensions keying each series; duplicates are ignored
    #[serde(default)]
    pub grouping: Vec<String>,
    /// Dimension aggregated per bucket
    pub accumulation: String,
    /// Aggregate function
    #[serde(default)]
    pub aggregate: AggregateFunction,
    /// Convert the date column to this zone before bucketing
    #[serde(default)]
    pub timezone: Option<String>,
}

impl SeriesQueryRequest {
    /// Start building a request
    pub fn builder(accumulation: impl Into<String>, date_range: DateRange) -> SeriesQueryBuilder {
        SeriesQueryBuilder::new(accumulation, date_range)
    }

    /// Non-empty timezone, if any
    pub fn effective_timezone(&self) -> Option<&str> {
        self.timezone.as_deref().map(str::trim).filter(|tz| !tz.is_empty())
    }

    /// Grouping ids with duplicates removed, first occurrence kept
    pub fn distinct_grouping(&self) -> Vec<&str> {
        let mut seen = Vec::with_capacity(self.grouping.len());
        for id in &self.grouping {
            if !seen.contains(&id.as_str()) {
                seen.push(id.as_str());
            }
        }
        seen
    }
}

/// Builder for [`SeriesQueryRequest`]
#[derive(Debug, Clone)]
pub struct SeriesQueryBuilder {
    request: SeriesQueryRequest,
}

impl SeriesQueryBuilder {
    /// Daily PostgreSQL SUM over `accumulation` by default
    pub fn new(accumulation: impl Into<String>, date_range: DateRange) -> Self {
        Self {
            request: SeriesQueryRequest {
                filters: Vec::new(),
                date_range,
                resolution: ResolutionUnit::Daily,
                dialect: Dialect::Pgsql,
                grouping: Vec::new(),
                accumulation: accumulation.into(),
                aggregate: AggregateFunction::default(),
                timezone: None,
            },
        }
    }

    /// Set the backend dialect
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.request.dialect = dialect;
        self
    }

    /// Set the bucket size
    pub fn resolution(mut self, unit: ResolutionUnit) -> Self {
        self.request.resolution = unit;
        self
    }

    /// Add a grouping dimension
    pub fn group_by(mut self, id: impl Into<String>) -> Self {
        self.request.grouping.push(id.into());
        self
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.request.filters.push(filter);
        self
    }

    /// Set the aggregate function
    pub fn aggregate(mut self, aggregate: AggregateFunction) -> Self {
        self.request.aggregate = aggregate;
        self
    }

    /// Set the timezone
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.request.timezone = Some(timezone.into());
        self
    }

    /// Build the request
    pub fn build(self) -> SeriesQueryRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Relation;

    fn range() -> DateRange {
        DateRange::days(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
        )
    }

    #[test]
    fn test_builder_defaults() {
        let request = SeriesQueryRequest::builder("cases", range()).build();
        assert_eq!(request.dialect, Dialect::Pgsql);
        assert_eq!(request.resolution, ResolutionUnit::Daily);
        assert_eq!(request.aggregate, AggregateFunction::Sum);
        assert!(request.effective_timezone().is_none());
    }

    #[test]
    fn test_day_range_bounds() {
        let r = range();
        assert_eq!(r.start.to_string(), "2021-01-01 00:00:00");
        assert_eq!(r.end.to_string(), "2021-03-31 23:59:59.999");
        assert!(r.is_ordered());
        assert!(!DateRange::new(r.end, r.start).is_ordered());
    }

    #[test]
    fn test_distinct_grouping() {
        let request = SeriesQueryRequest::builder("cases", range())
            .group_by("region")
            .group_by("sex")
            .group_by("region")
            .timezone("  ")
            .build();
        assert_eq!(request.distinct_grouping(), vec!["region", "sex"]);
        assert!(request.effective_timezone().is_none());
    }

    #[test]
    fn test_json_request() {
        let request: SeriesQueryRequest = serde_json::from_str(
            r#"{
                "filters": [
                    {"id": "region", "relation": "in", "argument": ["north", "south"]},
                    {"id": "age", "relation": "gte", "argument": 18}
                ],
                "date_range": {"start": "2021-01-01T00:00:00", "end": "2021-12-31T23:59:59"},
                "resolution": "MONTHLY",
                "dialect": "MYSQL",
                "grouping": ["region"],
                "accumulation": "cases",
                "timezone": "Europe/Paris"
            }"#,
        )
        .unwrap();

        assert_eq!(request.filters.len(), 2);
        assert_eq!(request.filters[0].relation, Relation::In);
        assert_eq!(request.resolution, ResolutionUnit::Monthly);
        assert_eq!(request.dialect, Dialect::Mysql);
        assert_eq!(request.aggregate, AggregateFunction::Sum);
        assert_eq!(request.effective_timezone(), Some("Europe/Paris"));
    }
}
