//! Validation error types
//!
//! Raised before any SQL reaches a backend. Every variant names the filter or
//! dimension it concerns.

use super::Relation;
use thiserror::Error;

/// A request or filter was rejected before query execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `IN` was given something other than a list
    #[error("Filter '{filter_id}': membership relation requires a list of values")]
    NotACollection { filter_id: String },

    /// `IN` was given an empty list
    #[error("Filter '{filter_id}': membership relation requires at least one value")]
    EmptyMembership { filter_id: String },

    /// Relation not among the dimension's allowed relations
    #[error("Filter '{filter_id}': relation '{relation}' is not allowed")]
    RelationNotAllowed { filter_id: String, relation: Relation },

    /// Null argument where nulls are not permitted
    #[error("Filter '{filter_id}': relation '{relation}' does not accept null arguments")]
    NullArgument { filter_id: String, relation: Relation },

    /// Wrong number of arguments for the relation
    #[error("Filter '{filter_id}': relation '{relation}' expects {expected} argument(s), got {found}")]
    Arity {
        filter_id: String,
        relation: Relation,
        expected: usize,
        found: usize,
    },

    /// LIKE with a non-text pattern
    #[error("Filter '{filter_id}': pattern argument must be text")]
    PatternNotText { filter_id: String },

    /// An ordering relation was compiled as a predicate
    #[error("Filter '{filter_id}': ordering relation '{relation}' is not a predicate")]
    NotAPredicate { filter_id: String, relation: Relation },

    /// Ordering requested on a dimension that is not grouped
    #[error("Filter '{filter_id}': ordering applies only to grouping dimensions")]
    OrderingOnNonGrouping { filter_id: String },

    /// Request names a dimension the data source does not define
    #[error("Unknown dimension: {dimension_id}")]
    UnknownDimension { dimension_id: String },

    /// Dimension lacks the role the request uses it in
    #[error("Dimension '{dimension_id}' is not configured as a {role} dimension")]
    MissingRole {
        dimension_id: String,
        role: &'static str,
    },

    /// Date range start is after its end
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    /// Timezone is neither an IANA zone name nor a UTC offset
    #[error("Invalid timezone: '{timezone}'")]
    InvalidTimezone { timezone: String },
}
