//! Time-bucketed series queries
//!
//! Takes a declarative [`SeriesQueryRequest`] through to ordered
//! [`GroupedTimeSeries`]:
//!
//! - **planner**: validates the request and builds one grouped SELECT
//! - **backend**: the connection seam the statement runs on
//! - **assemble**: partitions rows into per-group, bucket-ordered series
//! - **source**: [`DataSeriesSource`], the orchestrator tying them together
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use seriesql::resolution::{ResolutionFactory, ResolutionUnit, WeekStart};
//! use seriesql::schema::{DataSource, Dimension, DimensionRole, DimensionType};
//! use seriesql::series::{DataSeriesSource, DateRange, SeriesQueryRequest, StaticProvider};
//! use std::sync::Arc;
//!
//! let source = DataSource::new("visits", "visit_date")
//!     .dimension(Dimension::new("visit_date", "visit_date", DimensionType::Date))
//!     .dimension(
//!         Dimension::new("cases", "case_count", DimensionType::Integer)
//!             .role(DimensionRole::Accumulation),
//!     );
//! let factory = Arc::new(ResolutionFactory::new(WeekStart::MONDAY));
//! let engine = DataSeriesSource::new(source, factory, StaticProvider::new(Vec::new())).unwrap();
//!
//! let range = DateRange::days(
//!     NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2013, 12, 31).unwrap(),
//! );
//! let request = SeriesQueryRequest::builder("cases", range)
//!     .resolution(ResolutionUnit::Yearly)
//!     .build();
//!
//! let statement = engine.build_statement(&request).unwrap();
//! assert!(statement.sql.starts_with("SELECT CAST(EXTRACT(YEAR FROM visit_date) AS INTEGER)"));
//! assert!(engine.series_query(&request).unwrap().is_empty());
//! ```

mod aggregate;
mod assemble;
pub mod backend;
mod error;
mod planner;
mod point;
mod request;
mod source;

pub use aggregate::AggregateFunction;
pub use assemble::group_points;
pub use backend::{Connection, ConnectionProvider, SqlRow, StaticProvider};
pub use error::{AggregateValueError, BackendError, RowShapeError, SeriesError, SeriesResult};
pub use planner::{SeriesPlanner, SeriesStatement, ACCUMULATED_ALIAS};
pub use point::{AccumPoint, GroupKey, GroupedTimeSeries, SeriesPoint};
pub use request::{DateRange, SeriesQueryBuilder, SeriesQueryRequest};
pub use source::DataSeriesSource;
