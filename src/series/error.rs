//! Series query error types
//!
//! Any failure yields no series at all; there are no partial results.

use crate::dialect::Dialect;
use crate::filter::ValidationError;
use crate::resolution::{ConfigurationError, ResolutionUnit};
use thiserror::Error;

/// Error raised by a backend driver
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while running a series query
#[derive(Error, Debug)]
pub enum SeriesError {
    /// Request rejected before execution
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Engine misconfigured for the request
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Backend connectivity or execution failure
    #[error("Data access error ({dialect}/{unit}): {source}\n  SQL: {sql}")]
    DataAccess {
        dialect: Dialect,
        unit: ResolutionUnit,
        sql: String,
        #[source]
        source: BackendError,
    },
}

impl SeriesError {
    /// Whether the error was raised before any SQL reached the backend
    pub fn is_pre_execution(&self) -> bool {
        !matches!(self, Self::DataAccess { .. })
    }
}

/// Result type for series operations
pub type SeriesResult<T> = Result<T, SeriesError>;

/// A backend row did not have the shape the statement selects
#[derive(Error, Debug)]
#[error("row {row} has {found} columns, expected {expected}")]
pub struct RowShapeError {
    /// Zero-based row index
    pub row: usize,
    /// Columns present
    pub found: usize,
    /// Columns the statement selects
    pub expected: usize,
}

/// A backend row carried a non-numeric aggregate
#[derive(Error, Debug)]
#[error("row {row}: aggregate value {value} is not numeric")]
pub struct AggregateValueError {
    /// Zero-based row index
    pub row: usize,
    /// Offending cell, as displayed
    pub value: String,
}
