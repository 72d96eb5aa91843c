//! Filter relations
//!
//! The fixed set of comparisons a filter may express. Each dimension declares
//! the subset it accepts; see [`super::validate`].

use serde::{Deserialize, Serialize};

/// Comparison relation of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Inclusive range, two arguments
    Between,
    /// Membership in a non-empty list
    In,
    /// SQL pattern match
    Like,
    /// Ascending ordering
    Asc,
    /// Descending ordering
    Desc,
}

impl Relation {
    /// Relations that render a WHERE predicate
    pub const PREDICATES: [Relation; 9] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Gt,
        Relation::Gte,
        Relation::Lt,
        Relation::Lte,
        Relation::Between,
        Relation::In,
        Relation::Like,
    ];

    /// Parse from an operator symbol or keyword
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "=" | "==" | "eq" => Some(Self::Eq),
            "!=" | "<>" | "ne" => Some(Self::Ne),
            ">" | "gt" => Some(Self::Gt),
            ">=" | "gte" => Some(Self::Gte),
            "<" | "lt" => Some(Self::Lt),
            "<=" | "lte" => Some(Self::Lte),
            "between" => Some(Self::Between),
            "in" => Some(Self::In),
            "like" => Some(Self::Like),
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// SQL operator keyword for predicate relations
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::Like => "LIKE",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Whether this relation takes a list of values
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In)
    }

    /// Whether this relation orders rather than restricts
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Asc | Self::Desc)
    }

    /// Whether a null argument has a SQL meaning (`IS [NOT] NULL`)
    pub fn accepts_null(&self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::In)
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::In => "in",
            Self::Like => "like",
            Self::Asc => "asc",
            Self::Desc => "desc",
        };
        write!(f, "{}", name)
    }
}
