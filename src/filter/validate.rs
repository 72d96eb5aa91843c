//! Filter argument validation
//!
//! Rules, checked in order:
//! 1. a membership relation needs a non-empty list
//! 2. the relation must be allowed for the dimension
//! 3. null arguments are rejected unless the dimension permits them, and
//!    only equality and membership relations accept them at all
//!
//! Arity of the remaining relations is checked last: `between` takes exactly
//! two values, ordering relations ignore their argument, everything else
//! takes one.

use super::{Filter, FilterArgument, Relation, ValidationError};

/// Validate a filter against the relations its dimension allows
pub fn validate(
    filter: &Filter,
    allowed: &[Relation],
    null_allowed: bool,
) -> Result<(), ValidationError> {
    validate_arguments(
        &filter.id,
        filter.relation,
        &filter.argument,
        allowed,
        null_allowed,
    )
}

/// Validate a relation and its argument(s)
pub fn validate_arguments(
    filter_id: &str,
    relation: Relation,
    argument: &FilterArgument,
    allowed: &[Relation],
    null_allowed: bool,
) -> Result<(), ValidationError> {
    if relation.is_membership() {
        match argument {
            FilterArgument::List(values) if values.is_empty() => {
                return Err(ValidationError::EmptyMembership {
                    filter_id: filter_id.to_string(),
                });
            }
            FilterArgument::List(_) => {}
            FilterArgument::Single(_) => {
                return Err(ValidationError::NotACollection {
                    filter_id: filter_id.to_string(),
                });
            }
        }
    }

    if !allowed.contains(&relation) {
        return Err(ValidationError::RelationNotAllowed {
            filter_id: filter_id.to_string(),
            relation,
        });
    }

    // Ordering relations carry no relevant argument
    if relation.is_ordering() {
        return Ok(());
    }

    let has_null = argument.values().iter().any(|v| v.is_null());
    if has_null && (!null_allowed || !relation.accepts_null()) {
        return Err(ValidationError::NullArgument {
            filter_id: filter_id.to_string(),
            relation,
        });
    }

    let expected = match relation {
        Relation::In => return Ok(()),
        Relation::Between => 2,
        _ => 1,
    };
    let found = match argument {
        FilterArgument::List(values) => values.len(),
        FilterArgument::Single(_) => 1,
    };
    // Ranges must be lists, scalars must not be
    let shape_ok = match argument {
        FilterArgument::List(values) => expected == 2 && values.len() == 2,
        FilterArgument::Single(_) => expected == 1,
    };
    if !shape_ok {
        return Err(ValidationError::Arity {
            filter_id: filter_id.to_string(),
            relation,
            expected,
            found,
        });
    }

    if relation == Relation::Like {
        if let FilterArgument::Single(value) = argument {
            if !value.is_null() && value.as_str().is_none() {
                return Err(ValidationError::PatternNotText {
                    filter_id: filter_id.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SqlValue;

    const ALL: [Relation; 11] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Gt,
        Relation::Gte,
        Relation::Lt,
        Relation::Lte,
        Relation::Between,
        Relation::In,
        Relation::Like,
        Relation::Asc,
        Relation::Desc,
    ];

    #[test]
    fn test_membership_requires_non_empty_list() {
        let err = validate(&Filter::any_of("region", vec![]), &ALL, false).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyMembership { .. }));

        let scalar = Filter::compare("region", Relation::In, "north");
        let err = validate(&scalar, &ALL, false).unwrap_err();
        assert!(matches!(err, ValidationError::NotACollection { .. }));
    }

    #[test]
    fn test_membership_with_values() {
        let filter = Filter::any_of(
            "age",
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)],
        );
        assert!(validate(&filter, &ALL, false).is_ok());
    }

    #[test]
    fn test_membership_checked_before_allowed_relations() {
        let err = validate(&Filter::any_of("region", vec![]), &[Relation::Eq], false).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyMembership { .. }));
    }

    #[test]
    fn test_relation_not_allowed() {
        let filter = Filter::compare("age", Relation::Gt, 10);
        let err = validate(&filter, &[Relation::Eq, Relation::In], false).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RelationNotAllowed {
                filter_id: "age".into(),
                relation: Relation::Gt,
            }
        );
    }

    #[test]
    fn test_null_argument() {
        let filter = Filter::eq("sex", SqlValue::Null);

        let err = validate(&filter, &ALL, false).unwrap_err();
        assert!(matches!(err, ValidationError::NullArgument { .. }));

        assert!(validate(&filter, &ALL, true).is_ok());
    }

    #[test]
    fn test_null_inside_membership_list() {
        let filter = Filter::any_of("sex", vec!["F".into(), SqlValue::Null]);
        assert!(validate(&filter, &ALL, false).is_err());
        assert!(validate(&filter, &ALL, true).is_ok());
    }

    #[test]
    fn test_null_with_ordering_comparison() {
        let ordered = [
            Relation::Gt,
            Relation::Lt,
            Relation::Gte,
            Relation::Lte,
            Relation::Like,
        ];
        for relation in ordered {
            let filter = Filter::compare("age", relation, SqlValue::Null);
            assert_eq!(
                validate(&filter, &ALL, true),
                Err(ValidationError::NullArgument {
                    filter_id: "age".into(),
                    relation,
                })
            );
        }

        let range = Filter::between("age", SqlValue::Null, 9);
        assert!(matches!(
            validate(&range, &ALL, true),
            Err(ValidationError::NullArgument { .. })
        ));
    }

    #[test]
    fn test_between_arity() {
        assert!(validate(&Filter::between("age", 1, 5), &ALL, false).is_ok());

        let three = Filter::new(
            "age",
            Relation::Between,
            FilterArgument::List(vec![1.into(), 2.into(), 3.into()]),
        );
        let err = validate(&three, &ALL, false).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Arity {
                expected: 2,
                found: 3,
                ..
            }
        ));

        let scalar = Filter::compare("age", Relation::Between, 4);
        assert!(validate(&scalar, &ALL, false).is_err());
    }

    #[test]
    fn test_scalar_relations_reject_lists() {
        let filter = Filter::new(
            "age",
            Relation::Eq,
            FilterArgument::List(vec![1.into()]),
        );
        assert!(matches!(
            validate(&filter, &ALL, false),
            Err(ValidationError::Arity { .. })
        ));
    }

    #[test]
    fn test_like_requires_text() {
        assert!(validate(&Filter::compare("name", Relation::Like, "A%"), &ALL, false).is_ok());
        assert!(matches!(
            validate(&Filter::compare("name", Relation::Like, 7), &ALL, false),
            Err(ValidationError::PatternNotText { .. })
        ));
    }

    #[test]
    fn test_ordering_ignores_argument() {
        let filter = Filter::new("region", Relation::Desc, FilterArgument::default());
        assert!(validate(&filter, &ALL, false).is_ok());
    }
}
