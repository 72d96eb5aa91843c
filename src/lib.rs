//! # seriesql
//!
//! Dialect-aware time-series aggregation over relational tables. A
//! declarative request (filters, date range, grouping dimensions, an
//! accumulation column and a time resolution) becomes one grouped SQL
//! statement for MySQL or PostgreSQL, and the returned rows come back as
//! canonical, bucket-ordered series.
//!
//! ## Modules
//!
//! - [`schema`]: dimensions and the data source they belong to
//! - [`filter`]: filter validation and predicate compilation
//! - [`resolution`]: per-dialect time bucketing, epi weeks, handler dispatch
//! - [`series`]: request planning, execution and series assembly
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use seriesql::dialect::Dialect;
//! use seriesql::filter::Filter;
//! use seriesql::resolution::{ResolutionFactory, ResolutionUnit, WeekStart};
//! use seriesql::schema::{DataSource, Dimension, DimensionRole, DimensionType};
//! use seriesql::filter::SqlValue;
//! use seriesql::series::{DataSeriesSource, DateRange, SeriesQueryRequest, SqlRow, StaticProvider};
//! use std::sync::Arc;
//!
//! let source = DataSource::new("visits", "visit_date")
//!     .dimension(Dimension::new("visit_date", "visit_date", DimensionType::Date))
//!     .dimension(
//!         Dimension::new("region", "region", DimensionType::Text)
//!             .role(DimensionRole::Grouping)
//!             .role(DimensionRole::Filter),
//!     )
//!     .dimension(
//!         Dimension::new("cases", "case_count", DimensionType::Integer)
//!             .role(DimensionRole::Accumulation),
//!     );
//!
//! // Rows as the backend would return them: region, year, month, SUM
//! let provider = StaticProvider::new(vec![
//!     SqlRow::new(vec!["north".into(), SqlValue::Int(2021), SqlValue::Int(2), SqlValue::Float(5.0)]),
//!     SqlRow::new(vec!["north".into(), SqlValue::Int(2021), SqlValue::Int(1), SqlValue::Float(3.0)]),
//! ]);
//!
//! let factory = Arc::new(ResolutionFactory::new(WeekStart::SUNDAY));
//! let engine = DataSeriesSource::new(source, factory, provider).unwrap();
//!
//! let range = DateRange::days(
//!     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
//! );
//! let request = SeriesQueryRequest::builder("cases", range)
//!     .dialect(Dialect::Mysql)
//!     .resolution(ResolutionUnit::Monthly)
//!     .group_by("region")
//!     .filter(Filter::eq("region", "north"))
//!     .build();
//!
//! let series = engine.series_query(&request).unwrap();
//! assert_eq!(series.len(), 1);
//! assert_eq!(series[0].points[0].value, 3.0);
//! ```

pub mod config;
pub mod dialect;
pub mod filter;
pub mod resolution;
pub mod schema;
pub mod series;

// Re-export top-level types for convenience
pub use dialect::Dialect;

pub use filter::{Filter, FilterArgument, Relation, SqlValue, ValidationError};

pub use resolution::{
    ConfigurationError, ResolutionFactory, ResolutionHandler, ResolutionUnit, WeekStart,
};

pub use schema::{DataSource, Dimension, DimensionRole, DimensionType};

pub use series::{
    AggregateFunction, DataSeriesSource, DateRange, GroupedTimeSeries, SeriesError,
    SeriesQueryRequest, SeriesResult,
};

pub use config::{Config, ConfigError};
