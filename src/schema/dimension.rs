//! Dimension definitions
//!
//! A dimension is a named, typed field backed by a column. Its roles decide
//! where a request may use it; its relations decide which filters it accepts.

use crate::filter::{Filter, FilterArgument, Relation, SqlValue};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Value type of a dimension's backing column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionType {
    /// Free text
    Text,
    /// Whole numbers
    Integer,
    /// Decimal numbers
    Number,
    /// Date or timestamp
    Date,
    /// True/false
    Boolean,
}

impl DimensionType {
    /// Convert a loosely typed value into this type's bind value.
    ///
    /// Only date dimensions reinterpret text (ISO timestamps or plain dates).
    /// Anything that does not parse is returned unchanged.
    pub fn coerce(&self, value: SqlValue) -> SqlValue {
        match (self, value) {
            (Self::Date, SqlValue::Text(text)) => parse_timestamp(&text)
                .map(SqlValue::Timestamp)
                .unwrap_or(SqlValue::Text(text)),
            (_, value) => value,
        }
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// How a dimension may be used in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionRole {
    /// Returned in results
    Result,
    /// Accepts filters
    Filter,
    /// May key a series
    Grouping,
    /// May be aggregated
    Accumulation,
}

impl DimensionRole {
    /// Lowercase role name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::Filter => "filter",
            Self::Grouping => "grouping",
            Self::Accumulation => "accumulation",
        }
    }
}

fn default_relations() -> Vec<Relation> {
    vec![
        Relation::Eq,
        Relation::Ne,
        Relation::In,
        Relation::Asc,
        Relation::Desc,
    ]
}

/// A configured dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Identifier used in requests
    pub id: String,
    /// Backing column expression
    pub column: String,
    /// Value type
    #[serde(rename = "type")]
    pub dimension_type: DimensionType,
    /// Roles
    #[serde(default)]
    pub roles: Vec<DimensionRole>,
    /// Filter relations accepted
    #[serde(default = "default_relations")]
    pub relations: Vec<Relation>,
    /// Whether filters may pass null
    #[serde(default)]
    pub nullable: bool,
}

impl Dimension {
    /// Create a dimension with no roles
    pub fn new(
        id: impl Into<String>,
        column: impl Into<String>,
        dimension_type: DimensionType,
    ) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
            dimension_type,
            roles: Vec::new(),
            relations: default_relations(),
            nullable: false,
        }
    }

    /// Builder method: add a role
    pub fn role(mut self, role: DimensionRole) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    /// Builder method: replace the accepted relations
    pub fn relations(mut self, relations: &[Relation]) -> Self {
        self.relations = relations.to_vec();
        self
    }

    /// Builder method: allow null filter arguments
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Check a role
    pub fn has_role(&self, role: DimensionRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_result(&self) -> bool {
        self.has_role(DimensionRole::Result)
    }

    pub fn is_filter(&self) -> bool {
        self.has_role(DimensionRole::Filter)
    }

    pub fn is_grouping(&self) -> bool {
        self.has_role(DimensionRole::Grouping)
    }

    pub fn is_accumulation(&self) -> bool {
        self.has_role(DimensionRole::Accumulation)
    }
    /// Copy of `filter` with its arguments coerced to this dimension's type
    pub fn coerce_filter(&self, filter: &Filter) -> Filter {
        let coerce = |v: &SqlValue| self.dimension_type.coerce(v.clone());
        let argument = match &filter.argument {
            FilterArgument::List(values) => {
                FilterArgument::List(values.iter().map(coerce).collect())
            }
            FilterArgument::Single(value) => FilterArgument::Single(coerce(value)),
        };
        Filter::new(filter.id.clone(), filter.relation, argument)
    }
}
