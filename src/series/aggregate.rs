//! Aggregate functions over the accumulation column

use serde::{Deserialize, Serialize};

/// SQL aggregate applied per bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    /// Sum of values
    #[default]
    Sum,
    /// Count of non-null values
    Count,
    /// Average of values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl AggregateFunction {
    /// Parse from string
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Some(Self::Sum),
            "count" => Some(Self::Count),
            "avg" | "average" | "mean" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Render over a column expression
    pub fn render(&self, column: &str) -> String {
        format!("{}({})", self, column)
    }

    /// Combine two values that landed in the same bucket.
    ///
    /// Exact for every function except `Avg`, where the unweighted mean of
    /// the two partial averages is returned.
    pub fn merge(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Sum | Self::Count => a + b,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Avg => (a + b) / 2.0,
        }
    }

    /// Whether [`merge`](Self::merge) reproduces what the database would have
    /// computed over the combined rows
    pub fn merge_is_exact(&self) -> bool {
        !matches!(self, Self::Avg)
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sum => write!(f, "SUM"),
            Self::Count => write!(f, "COUNT"),
            Self::Avg => write!(f, "AVG"),
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(AggregateFunction::Sum.render("cases"), "SUM(cases)");
        assert_eq!(AggregateFunction::default(), AggregateFunction::Sum);
        assert_eq!(AggregateFunction::from_token("AVERAGE"), Some(AggregateFunction::Avg));
        assert_eq!(AggregateFunction::from_token("median"), None);
    }

    #[test]
    fn test_merge() {
        assert_eq!(AggregateFunction::Sum.merge(2.0, 3.0), 5.0);
        assert_eq!(AggregateFunction::Count.merge(2.0, 3.0), 5.0);
        assert_eq!(AggregateFunction::Min.merge(2.0, 3.0), 2.0);
        assert_eq!(AggregateFunction::Max.merge(2.0, 3.0), 3.0);
        assert_eq!(AggregateFunction::Avg.merge(2.0, 4.0), 3.0);
    }

    #[test]
    fn test_merge_exactness() {
        assert!(AggregateFunction::Sum.merge_is_exact());
        assert!(AggregateFunction::Count.merge_is_exact());
        assert!(AggregateFunction::Min.merge_is_exact());
        assert!(AggregateFunction::Max.merge_is_exact());
        assert!(!AggregateFunction::Avg.merge_is_exact());
    }
}
