//! Filter compilation
//!
//! Renders validated filters into SQL predicate fragments of the form
//! `<column> <operator> <placeholder(s)>`. Values are never inlined; they are
//! returned alongside the fragment for binding.

use super::{Filter, FilterArgument, Relation, SqlValue, ValidationError};
use crate::dialect::Dialect;
use serde::{Deserialize, Serialize};

/// Allocates bind placeholders in statement order
#[derive(Debug, Clone)]
pub struct Placeholders {
    dialect: Dialect,
    issued: usize,
}

impl Placeholders {
    /// Start numbering at 1 for the given dialect
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect, issued: 0 }
    }

    /// Next placeholder
    pub fn next(&mut self) -> String {
        self.issued += 1;
        self.dialect.placeholder(self.issued)
    }

    /// Number of placeholders issued so far
    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// A compiled WHERE fragment with its bind values
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// SQL fragment
    pub sql: String,
    /// Values for the fragment's placeholders, in order
    pub params: Vec<SqlValue>,
}

/// Compile a predicate filter against a column expression
pub fn compile(
    filter: &Filter,
    column: &str,
    placeholders: &mut Placeholders,
) -> Result<Predicate, ValidationError> {
    if filter.relation.is_ordering() {
        return Err(ValidationError::NotAPredicate {
            filter_id: filter.id.clone(),
            relation: filter.relation,
        });
    }

    let values: Vec<SqlValue> = filter.argument.values().into_iter().cloned().collect();
    let null_argument = || ValidationError::NullArgument {
        filter_id: filter.id.clone(),
        relation: filter.relation,
    };

    let sql = match (filter.relation, &filter.argument) {
        (Relation::In, FilterArgument::List(list)) => {
            // NULL never matches inside IN; test it separately
            let present: Vec<SqlValue> =
                list.iter().filter(|v| !v.is_null()).cloned().collect();
            let wants_null = present.len() < list.len();
            let marks: Vec<String> = present.iter().map(|_| placeholders.next()).collect();
            let sql = match (marks.is_empty(), wants_null) {
                (true, _) => format!("{} IS NULL", column),
                (false, false) => format!("{} IN ({})", column, marks.join(", ")),
                (false, true) => {
                    format!("({} IN ({}) OR {} IS NULL)", column, marks.join(", "), column)
                }
            };
            return Ok(Predicate {
                sql,
                params: present,
            });
        }
        (Relation::Between, FilterArgument::List(list)) if list.len() == 2 => {
            if list.iter().any(SqlValue::is_null) {
                return Err(null_argument());
            }
            let low = placeholders.next();
            let high = placeholders.next();
            format!("{} BETWEEN {} AND {}", column, low, high)
        }
        (Relation::In | Relation::Between, _) => {
            return Err(ValidationError::Arity {
                filter_id: filter.id.clone(),
                relation: filter.relation,
                expected: if filter.relation == Relation::Between { 2 } else { 1 },
                found: values.len(),
            });
        }
        (relation, FilterArgument::Single(value)) if value.is_null() => {
            let sql = match relation {
                Relation::Eq => format!("{} IS NULL", column),
                Relation::Ne => format!("{} IS NOT NULL", column),
                _ => return Err(null_argument()),
            };
            return Ok(Predicate {
                sql,
                params: Vec::new(),
            });
        }
        (relation, _) => format!("{} {} {}", column, relation.operator(), placeholders.next()),
    };

    Ok(Predicate {
        sql,
        params: values,
    })
}

/// Sort direction of an ordering filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    #[default]
    Ascending,
    /// Descending
    Descending,
}

impl SortDirection {
    /// Parse an `asc`/`desc` token; anything else means ascending
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(|t| t.trim().to_lowercase()) {
            Some(t) if t == "desc" || t == "descending" => Self::Descending,
            _ => Self::Ascending,
        }
    }

    /// SQL keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Ordering variant of a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    /// Dimension id to order by
    pub id: String,
    /// Direction
    pub direction: SortDirection,
}

impl OrderFilter {
    /// Create from a direction token
    pub fn new(id: impl Into<String>, token: Option<&str>) -> Self {
        Self {
            id: id.into(),
            direction: SortDirection::from_token(token),
        }
    }

    /// Ordering view of a filter with an `asc`/`desc` relation
    pub fn from_filter(filter: &Filter) -> Option<Self> {
        filter
            .relation
            .is_ordering()
            .then(|| Self::new(filter.id.clone(), Some(filter.relation.operator())))
    }

    /// Parse `dimension[:direction]`
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((id, token)) => Self::new(id.trim(), Some(token)),
            None => Self::new(text.trim(), None),
        }
    }

    /// Render `<column> ASC|DESC`
    pub fn compile(&self, column: &str) -> String {
        format!("{} {}", column, self.direction.keyword())
    }

    /// Filter equivalent, for inclusion in a request
    pub fn to_filter(&self) -> Filter {
        Filter::order(self.id.clone(), self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_comparisons() {
        let mut ph = Placeholders::new(Dialect::Mysql);
        let p = compile(&Filter::compare("age", Relation::Gte, 18), "p.age", &mut ph).unwrap();
        assert_eq!(p.sql, "p.age >= ?");
        assert_eq!(p.params, vec![SqlValue::Int(18)]);

        let p = compile(&Filter::compare("name", Relation::Like, "A%"), "name", &mut ph).unwrap();
        assert_eq!(p.sql, "name LIKE ?");
    }

    #[test]
    fn test_pgsql_numbering_continues() {
        let mut ph = Placeholders::new(Dialect::Pgsql);
        let first = compile(&Filter::eq("region", "north"), "region", &mut ph).unwrap();
        let second = compile(
            &Filter::any_of("age", vec![1.into(), 2.into(), 3.into()]),
            "age",
            &mut ph,
        )
        .unwrap();
        let third = compile(&Filter::between("visit", 1, 9), "visit", &mut ph).unwrap();

        assert_eq!(first.sql, "region = $1");
        assert_eq!(second.sql, "age IN ($2, $3, $4)");
        assert_eq!(third.sql, "visit BETWEEN $5 AND $6");
        assert_eq!(third.params, vec![SqlValue::Int(1), SqlValue::Int(9)]);
        assert_eq!(ph.issued(), 6);
    }

    #[test]
    fn test_null_renders_is_null() {
        let mut ph = Placeholders::new(Dialect::Pgsql);
        let p = compile(&Filter::eq("sex", SqlValue::Null), "sex", &mut ph).unwrap();
        assert_eq!(p.sql, "sex IS NULL");
        assert!(p.params.is_empty());

        let p = compile(
            &Filter::compare("sex", Relation::Ne, SqlValue::Null),
            "sex",
            &mut ph,
        )
        .unwrap();
        assert_eq!(p.sql, "sex IS NOT NULL");
        assert_eq!(ph.issued(), 0);
    }

    #[test]
    fn test_null_with_comparison_is_rejected() {
        let mut ph = Placeholders::new(Dialect::Pgsql);
        for relation in [Relation::Gt, Relation::Lt, Relation::Like] {
            let filter = Filter::compare("age", relation, SqlValue::Null);
            assert_eq!(
                compile(&filter, "age", &mut ph),
                Err(ValidationError::NullArgument {
                    filter_id: "age".into(),
                    relation,
                })
            );
        }
        assert_eq!(ph.issued(), 0);
    }

    #[test]
    fn test_null_inside_membership_list() {
        let mut ph = Placeholders::new(Dialect::Pgsql);
        let filter = Filter::any_of("sex", vec!["F".into(), SqlValue::Null, "M".into()]);
        let p = compile(&filter, "sex", &mut ph).unwrap();
        assert_eq!(p.sql, "(sex IN ($1, $2) OR sex IS NULL)");
        assert_eq!(p.params, vec![SqlValue::from("F"), SqlValue::from("M")]);

        let only_null = Filter::any_of("sex", vec![SqlValue::Null]);
        let p = compile(&only_null, "sex", &mut ph).unwrap();
        assert_eq!(p.sql, "sex IS NULL");
        assert!(p.params.is_empty());
        assert_eq!(ph.issued(), 2);
    }

    #[test]
    fn test_ordering_is_not_a_predicate() {
        let mut ph = Placeholders::new(Dialect::Mysql);
        let filter = Filter::order("region", SortDirection::Descending);
        assert!(matches!(
            compile(&filter, "region", &mut ph),
            Err(ValidationError::NotAPredicate { .. })
        ));
    }

    #[test]
    fn test_order_tokens() {
        assert_eq!(OrderFilter::new("r", Some("DESC")).compile("r"), "r DESC");
        assert_eq!(OrderFilter::new("r", Some("asc")).compile("r"), "r ASC");
        assert_eq!(OrderFilter::new("r", Some("sideways")).compile("r"), "r ASC");
        assert_eq!(OrderFilter::new("r", None).compile("r"), "r ASC");

        let parsed = OrderFilter::parse("region:Desc");
        assert_eq!(parsed.id, "region");
        assert_eq!(parsed.direction, SortDirection::Descending);
        assert_eq!(OrderFilter::parse("region").direction, SortDirection::Ascending);
    }

    #[test]
    fn test_order_from_filter() {
        let filter = Filter::order("region", SortDirection::Descending);
        let order = OrderFilter::from_filter(&filter).unwrap();
        assert_eq!(order.direction, SortDirection::Descending);
        assert_eq!(order.to_filter(), filter);

        assert!(OrderFilter::from_filter(&Filter::eq("region", "north")).is_none());
    }
}
