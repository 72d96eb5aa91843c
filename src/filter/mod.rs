//! Filter model, validation and compilation
//!
//! A [`Filter`] restricts (or orders) a dimension:
//!
//! - **relation**: one of the fixed [`Relation`]s
//! - **validate**: checks arguments against the dimension's allowed relations
//! - **compile**: renders a predicate fragment with dialect placeholders
//!
//! # Example
//!
//! ```rust
//! use seriesql::dialect::Dialect;
//! use seriesql::filter::{compile, validate, Filter, Placeholders, Relation};
//!
//! let filter = Filter::any_of("region", vec!["north".into(), "south".into()]);
//! validate(&filter, &[Relation::Eq, Relation::In], false).unwrap();
//!
//! let mut placeholders = Placeholders::new(Dialect::Pgsql);
//! let predicate = compile(&filter, "region", &mut placeholders).unwrap();
//! assert_eq!(predicate.sql, "region IN ($1, $2)");
//! ```

mod compile;
mod error;
mod relation;
mod validate;
mod value;

pub use compile::{compile, OrderFilter, Placeholders, Predicate, SortDirection};
pub use error::ValidationError;
pub use relation::Relation;
pub use validate::{validate, validate_arguments};
pub use value::SqlValue;

use serde::{Deserialize, Serialize};

/// Argument(s) carried by a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterArgument {
    /// Ordered collection (membership, ranges)
    List(Vec<SqlValue>),
    /// Single value, possibly null
    Single(SqlValue),
}

impl FilterArgument {
    /// Values in argument order
    pub fn values(&self) -> Vec<&SqlValue> {
        match self {
            Self::List(values) => values.iter().collect(),
            Self::Single(value) => vec![value],
        }
    }
}

impl Default for FilterArgument {
    fn default() -> Self {
        Self::Single(SqlValue::Null)
    }
}

/// A filter on one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Dimension id the filter applies to
    pub id: String,
    /// Comparison relation
    pub relation: Relation,
    /// Argument(s); absent means null
    #[serde(default)]
    pub argument: FilterArgument,
}

impl Filter {
    /// Create a new filter
    pub fn new(id: impl Into<String>, relation: Relation, argument: FilterArgument) -> Self {
        Self {
            id: id.into(),
            relation,
            argument,
        }
    }

    /// Single-value comparison
    pub fn compare(id: impl Into<String>, relation: Relation, value: impl Into<SqlValue>) -> Self {
        Self::new(id, relation, FilterArgument::Single(value.into()))
    }

    /// Equality filter
    pub fn eq(id: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(id, Relation::Eq, value)
    }

    /// Membership filter
    pub fn any_of(id: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self::new(id, Relation::In, FilterArgument::List(values))
    }

    /// Inclusive range filter
    pub fn between(
        id: impl Into<String>,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> Self {
        Self::new(
            id,
            Relation::Between,
            FilterArgument::List(vec![low.into(), high.into()]),
        )
    }

    /// Ordering filter
    pub fn order(id: impl Into<String>, direction: SortDirection) -> Self {
        let relation = match direction {
            SortDirection::Ascending => Relation::Asc,
            SortDirection::Descending => Relation::Desc,
        };
        Self::new(id, relation, FilterArgument::default())
    }
}
