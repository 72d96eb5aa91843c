//! SQL dialects
//!
//! Identifies the relational backend a statement is rendered for. Everything
//! that differs between backends (placeholder syntax, date extraction,
//! timezone conversion) is selected by matching on [`Dialect`].

use serde::{Deserialize, Serialize};

/// Target SQL backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB
    #[serde(alias = "MYSQL")]
    Mysql,
    /// PostgreSQL
    #[serde(alias = "PGSQL", alias = "postgres", alias = "postgresql")]
    Pgsql,
}

impl Dialect {
    /// Every supported dialect
    pub const ALL: [Dialect; 2] = [Dialect::Mysql, Dialect::Pgsql];

    /// Parse a dialect name (case-insensitive)
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::Mysql),
            "pgsql" | "postgres" | "postgresql" => Some(Self::Pgsql),
            _ => None,
        }
    }

    /// Render the bind placeholder for the `index`-th parameter (1-based)
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Mysql => "?".to_string(),
            Self::Pgsql => format!("${}", index),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mysql => write!(f, "mysql"),
            Self::Pgsql => write!(f, "pgsql"),
        }
    }
}
