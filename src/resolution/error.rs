//! Configuration error types
//!
//! A configuration error is a deployment defect: a missing handler mapping,
//! an unknown dialect name or a malformed data source. None are retried.

use super::ResolutionUnit;
use crate::dialect::Dialect;
use thiserror::Error;

/// Faults in the static configuration of the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Dialect name not recognised
    #[error("Unknown dialect: '{name}'")]
    UnknownDialect { name: String },

    /// No handler registered for the pair
    #[error("No resolution handler registered for {dialect}/{unit}")]
    MissingHandler {
        dialect: Dialect,
        unit: ResolutionUnit,
    },

    /// A registered handler serves a different unit than its key
    #[error("Handler registered for {dialect}/{expected} serves {found}")]
    CategoryMismatch {
        dialect: Dialect,
        expected: ResolutionUnit,
        found: ResolutionUnit,
    },

    /// A handler fails to rebuild the bucket it extracted
    #[error("Handler {dialect}/{unit} does not round-trip its own kernels")]
    KernelRoundTrip {
        dialect: Dialect,
        unit: ResolutionUnit,
    },

    /// Week start outside 0..=6
    #[error("Invalid week start day {day}: expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekStart { day: u8 },

    /// Data source definition is unusable
    #[error("Invalid data source: {0}")]
    InvalidSchema(String),
}
