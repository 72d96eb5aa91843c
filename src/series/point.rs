//! Series output types

use crate::filter::SqlValue;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Grouping dimension id → value, in request grouping order
pub type GroupKey = IndexMap<String, SqlValue>;

/// One aggregated (bucket, grouping key, value) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumPoint {
    /// Start of the time bucket
    pub bucket_start: NaiveDateTime,
    /// Grouping values of the row
    pub group_key: GroupKey,
    /// Aggregate over the bucket
    pub value: f64,
}

impl AccumPoint {
    /// Create a point
    pub fn new(bucket_start: NaiveDateTime, group_key: GroupKey, value: f64) -> Self {
        Self {
            bucket_start,
            group_key,
            value,
        }
    }
}

/// A bucket and its aggregate within one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Start of the time bucket
    pub bucket_start: NaiveDateTime,
    /// Aggregate over the bucket
    pub value: f64,
}

/// Points sharing one grouping key, ascending by bucket start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTimeSeries {
    /// Grouping values shared by every point; empty when ungrouped
    pub group_key: GroupKey,
    /// Buckets in ascending order, one per bucket start
    pub points: Vec<SeriesPoint>,
}

impl GroupedTimeSeries {
    /// Number of buckets
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all point values
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Value of the bucket starting at `bucket_start`
    pub fn value_at(&self, bucket_start: NaiveDateTime) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.bucket_start.cmp(&bucket_start))
            .ok()
            .map(|i| self.points[i].value)
    }
}
