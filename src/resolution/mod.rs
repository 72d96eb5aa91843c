//! Time resolution handling
//!
//! Buckets timestamps by a [`ResolutionUnit`] in a dialect-correct way:
//!
//! - **handlers**: one [`ResolutionHandler`] per (dialect, unit) pair, producing
//!   the GROUP BY expressions and rebuilding bucket starts ("kernels")
//! - **epiweek**: week numbering with a configurable start day
//! - **factory**: the immutable dispatch table from (dialect, unit) to handler
//!
//! # Pipeline
//!
//! ```text
//! date column → [tz convert] → grouping columns → GROUP BY → raw values → kernel
//! ```
//!
//! Both dialects' grouping expressions return canonical numbering (1-based
//! months, days and weeks), so kernel construction is shared.

pub mod epiweek;
mod error;
mod factory;
pub mod kernel;
mod mysql;
mod pgsql;
mod timezone;

pub use epiweek::WeekStart;
pub use error::ConfigurationError;
pub use factory::ResolutionFactory;
pub use mysql::MysqlHandler;
pub use pgsql::PgsqlHandler;
pub use timezone::validate_timezone;

use crate::dialect::Dialect;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Time-bucketing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionUnit {
    /// Bucket by hour
    #[serde(alias = "HOURLY")]
    Hourly,
    /// Bucket by calendar day
    #[serde(alias = "DAILY")]
    Daily,
    /// Bucket by epidemiological week
    #[serde(alias = "WEEKLY")]
    Weekly,
    /// Bucket by calendar month
    #[serde(alias = "MONTHLY")]
    Monthly,
    /// Bucket by calendar year
    #[serde(alias = "YEARLY")]
    Yearly,
}

impl ResolutionUnit {
    /// Every unit, finest first
    pub const ALL: [ResolutionUnit; 5] = [
        ResolutionUnit::Hourly,
        ResolutionUnit::Daily,
        ResolutionUnit::Weekly,
        ResolutionUnit::Monthly,
        ResolutionUnit::Yearly,
    ];

    /// Parse from string
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hourly" | "hour" | "h" => Some(Self::Hourly),
            "daily" | "day" | "d" => Some(Self::Daily),
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            "yearly" | "year" | "y" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Number of raw values the unit's grouping columns produce
    pub fn raw_width(&self) -> usize {
        match self {
            Self::Yearly => 1,
            Self::Monthly | Self::Weekly => 2,
            Self::Daily => 3,
            Self::Hourly => 4,
        }
    }
}

impl std::fmt::Display for ResolutionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hourly => write!(f, "hourly"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

/// Dialect-specific bucketing for one resolution unit
///
/// Implementations are immutable and shared across concurrent requests.
pub trait ResolutionHandler: Send + Sync + std::fmt::Debug {
    /// Dialect whose SQL this handler emits
    fn dialect(&self) -> Dialect;

    /// Unit served
    fn category(&self) -> ResolutionUnit;

    /// GROUP BY expressions identifying a bucket of `date_column`.
    ///
    /// A non-empty `timezone` converts the column before extraction; it must
    /// already have passed [`validate_timezone`].
    fn grouping_columns(&self, date_column: &str, timezone: Option<&str>) -> Vec<String>;

    /// Bucket start from raw values in `grouping_columns` order
    fn build_kernel(&self, raw: &[Option<i64>]) -> NaiveDateTime;

    /// Values the grouping columns would yield for `instant`
    fn raw_values(&self, instant: NaiveDateTime) -> Vec<i64>;
}
