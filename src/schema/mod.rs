//! Data source schema
//!
//! Describes the table a series query runs against: its date dimension and
//! the catalogue of dimensions a request may reference. Schemas are supplied
//! by configuration and are immutable once validated.

mod dimension;

pub use dimension::{Dimension, DimensionRole, DimensionType};

use crate::resolution::ConfigurationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("identifier pattern is valid")
    })
}

/// A queryable table and its dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Table (optionally schema-qualified)
    pub table: String,
    /// Id of the date dimension used for bucketing and range bounds
    pub date_dimension: String,
    /// Dimension catalogue
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl DataSource {
    /// Create an empty data source
    pub fn new(table: impl Into<String>, date_dimension: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            date_dimension: date_dimension.into(),
            dimensions: Vec::new(),
        }
    }

    /// Builder method: add a dimension
    pub fn dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Look up a dimension by id
    pub fn get(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    /// The date dimension
    pub fn date(&self) -> Option<&Dimension> {
        self.get(&self.date_dimension)
    }

    /// Check identifiers, uniqueness and the date dimension
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let pattern = identifier_pattern();

        if !pattern.is_match(&self.table) {
            return Err(ConfigurationError::InvalidSchema(format!(
                "table name '{}' is not a plain identifier",
                self.table
            )));
        }

        let mut seen = HashSet::new();
        for dim in &self.dimensions {
            if !seen.insert(dim.id.as_str()) {
                return Err(ConfigurationError::InvalidSchema(format!(
                    "duplicate dimension id '{}'",
                    dim.id
                )));
            }
            if !pattern.is_match(&dim.column) {
                return Err(ConfigurationError::InvalidSchema(format!(
                    "dimension '{}' column '{}' is not a plain identifier",
                    dim.id, dim.column
                )));
            }
        }

        match self.date() {
            None => Err(ConfigurationError::InvalidSchema(format!(
                "date dimension '{}' is not defined",
                self.date_dimension
            ))),
            Some(dim) if dim.dimension_type != DimensionType::Date => {
                Err(ConfigurationError::InvalidSchema(format!(
                    "date dimension '{}' has type {:?}",
                    dim.id, dim.dimension_type
                )))
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visits() -> DataSource {
        DataSource::new("public.visits", "visit_date")
            .dimension(Dimension::new("visit_date", "visit_date", DimensionType::Date))
            .dimension(
                Dimension::new("region", "region", DimensionType::Text)
                    .role(DimensionRole::Grouping),
            )
    }

    #[test]
    fn test_valid_source() {
        let source = visits();
        assert!(source.validate().is_ok());
        assert_eq!(source.get("region").map(|d| d.column.as_str()), Some("region"));
        assert!(source.get("nope").is_none());
    }

    #[test]
    fn test_rejects_missing_or_mistyped_date() {
        let source = DataSource::new("visits", "visit_date");
        assert!(source.validate().is_err());

        let source = DataSource::new("visits", "visit_date")
            .dimension(Dimension::new("visit_date", "visit_date", DimensionType::Text));
        assert!(source.validate().is_err());
    }

    #[test]
    fn test_rejects_unsafe_identifiers_and_duplicates() {
        let source = visits().dimension(Dimension::new(
            "evil",
            "region; DROP TABLE visits",
            DimensionType::Text,
        ));
        assert!(matches!(
            source.validate(),
            Err(ConfigurationError::InvalidSchema(_))
        ));

        let source = visits().dimension(Dimension::new("region", "region2", DimensionType::Text));
        assert!(source.validate().is_err());

        let mut source = visits();
        source.table = "visits v".into();
        assert!(source.validate().is_err());
    }
}
