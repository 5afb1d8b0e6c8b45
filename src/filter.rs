use crate::errors::EngineError;
use crate::models::{FieldKind, FilterCriterion, FilterSet, Record, RecordSchema};
use crate::record;

/// Applies every criterion in `filters` to `records` and keeps the records
/// that pass all of them. Criteria are validated against the schema up front
/// so a misconfigured page fails even on an empty collection.
pub fn apply_filters(
    records: &[Record],
    filters: &FilterSet,
    schema: &RecordSchema,
) -> Result<Vec<Record>, EngineError> {
    for criterion in &filters.criteria {
        validate_criterion(criterion, schema)?;
    }

    Ok(records
        .iter()
        .filter(|record| {
            filters
                .criteria
                .iter()
                .all(|criterion| matches_criterion(criterion, record))
        })
        .cloned()
        .collect())
}

fn validate_criterion(
    criterion: &FilterCriterion,
    schema: &RecordSchema,
) -> Result<(), EngineError> {
    match criterion {
        FilterCriterion::Range { field, .. } => {
            record::require_field(schema, field, FieldKind::Numeric)
        }
        FilterCriterion::DateRange { field, .. } => {
            record::require_field(schema, field, FieldKind::Timestamp)
        }
        FilterCriterion::Set { field, .. } => {
            record::require_field(schema, field, FieldKind::Categorical)
        }
        FilterCriterion::Flag { field, .. } => {
            record::require_field(schema, field, FieldKind::Flag)
        }
        FilterCriterion::Substring { field: None, .. } => Ok(()),
        FilterCriterion::Substring {
            field: Some(field), ..
        } => record::require_field(schema, field, FieldKind::Categorical),
    }
}

/// A record missing the value a criterion inspects does not pass it, except
/// for the empty `Set` which matches everything.
fn matches_criterion(criterion: &FilterCriterion, record: &Record) -> bool {
    match criterion {
        FilterCriterion::Range { field, min, max } => record
            .numeric
            .get(field)
            .is_some_and(|value| *min <= *value && *value <= *max),
        FilterCriterion::DateRange { field, min, max } => record
            .dates
            .get(field)
            .is_some_and(|value| *min <= *value && *value <= *max),
        FilterCriterion::Set { field, allowed } => {
            if allowed.is_empty() {
                return true;
            }
            record
                .categories
                .get(field)
                .is_some_and(|value| allowed.contains(value))
        }
        FilterCriterion::Flag { field, expected } => record
            .flags
            .get(field)
            .is_some_and(|value| value == expected),
        FilterCriterion::Substring { field, needle } => {
            let needle = needle.to_lowercase();
            let haystack = match field {
                None => Some(record.identity.as_str()),
                Some(field) => record.categories.get(field).map(String::as_str),
            };
            haystack.is_some_and(|value| value.to_lowercase().contains(&needle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;
    use chrono::NaiveDate;
    use std::collections::{BTreeMap, BTreeSet};

    fn schema() -> RecordSchema {
        let mut fields = BTreeMap::new();
        fields.insert("dr".to_string(), FieldKind::Numeric);
        fields.insert("rel_type".to_string(), FieldKind::Categorical);
        fields.insert("toxic".to_string(), FieldKind::Flag);
        fields.insert("first_seen".to_string(), FieldKind::Timestamp);
        RecordSchema {
            identity_field: "domain".to_string(),
            fields,
        }
    }

    fn record(domain: &str, dr: f64, rel_type: &str, toxic: bool) -> Record {
        let mut r = Record::new(domain);
        r.numeric.insert("dr".to_string(), dr);
        r.categories
            .insert("rel_type".to_string(), rel_type.to_string());
        r.flags.insert("toxic".to_string(), toxic);
        r
    }

    fn range(field: &str, min: f64, max: f64) -> FilterCriterion {
        FilterCriterion::Range {
            field: field.to_string(),
            min,
            max,
        }
    }

    #[test]
    fn range_filter_keeps_inclusive_bounds() {
        let records = vec![
            record("a.com", 80.0, "dofollow", false),
            record("b.com", 40.0, "dofollow", false),
            record("c.com", 60.0, "nofollow", false),
            record("d.com", 50.0, "ugc", false),
        ];
        let filters = FilterSet {
            criteria: vec![range("dr", 50.0, 100.0)],
        };
        let kept = apply_filters(&records, &filters, &schema()).unwrap();
        let identities: Vec<&str> = kept.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(identities, vec!["a.com", "c.com", "d.com"]);
    }

    #[test]
    fn criteria_combine_with_and_semantics() {
        let records = vec![
            record("a.com", 80.0, "dofollow", false),
            record("b.com", 75.0, "nofollow", false),
            record("c.com", 30.0, "dofollow", false),
        ];
        let mut allowed = BTreeSet::new();
        allowed.insert("dofollow".to_string());
        let filters = FilterSet {
            criteria: vec![
                range("dr", 50.0, 100.0),
                FilterCriterion::Set {
                    field: "rel_type".to_string(),
                    allowed,
                },
            ],
        };
        let kept = apply_filters(&records, &filters, &schema()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identity, "a.com");
    }

    #[test]
    fn empty_allowed_set_matches_all() {
        let records = vec![
            record("a.com", 80.0, "dofollow", false),
            record("b.com", 75.0, "nofollow", false),
        ];
        let filters = FilterSet {
            criteria: vec![FilterCriterion::Set {
                field: "rel_type".to_string(),
                allowed: BTreeSet::new(),
            }],
        };
        let kept = apply_filters(&records, &filters, &schema()).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn substring_is_case_insensitive_over_identity() {
        let records = vec![
            record("Blog.Example.com", 10.0, "dofollow", false),
            record("news.site.net", 10.0, "dofollow", false),
        ];
        let filters = FilterSet {
            criteria: vec![FilterCriterion::Substring {
                field: None,
                needle: "EXAMPLE".to_string(),
            }],
        };
        let kept = apply_filters(&records, &filters, &schema()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identity, "Blog.Example.com");
    }

    #[test]
    fn substring_with_designated_field_searches_that_category() {
        let mut bare = Record::new("bare.com");
        bare.numeric.insert("dr".to_string(), 10.0);
        let records = vec![
            record("a.com", 10.0, "DoFollow", false),
            record("b.com", 10.0, "sponsored", false),
            // no rel_type value at all
            bare,
        ];
        let filters = FilterSet {
            criteria: vec![FilterCriterion::Substring {
                field: Some("rel_type".to_string()),
                needle: "follow".to_string(),
            }],
        };
        let kept = apply_filters(&records, &filters, &schema()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identity, "a.com");
    }

    #[test]
    fn substring_designated_field_must_be_categorical() {
        let numeric_target = FilterSet {
            criteria: vec![FilterCriterion::Substring {
                field: Some("dr".to_string()),
                needle: "7".to_string(),
            }],
        };
        let err = apply_filters(&[], &numeric_target, &schema()).unwrap_err();
        assert!(matches!(err, EngineError::FieldNotFound { field } if field == "dr"));

        let undeclared_target = FilterSet {
            criteria: vec![FilterCriterion::Substring {
                field: Some("anchor_text".to_string()),
                needle: "cheap".to_string(),
            }],
        };
        let err = apply_filters(&[], &undeclared_target, &schema()).unwrap_err();
        assert!(matches!(err, EngineError::FieldNotFound { field } if field == "anchor_text"));
    }

    #[test]
    fn flag_filter_matches_expected_value() {
        let records = vec![
            record("a.com", 10.0, "dofollow", true),
            record("b.com", 10.0, "dofollow", false),
        ];
        let filters = FilterSet {
            criteria: vec![FilterCriterion::Flag {
                field: "toxic".to_string(),
                expected: true,
            }],
        };
        let kept = apply_filters(&records, &filters, &schema()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identity, "a.com");
    }

    #[test]
    fn date_range_is_inclusive() {
        let mut early = Record::new("a.com");
        early.dates.insert(
            "first_seen".to_string(),
            NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        );
        let mut late = Record::new("b.com");
        late.dates.insert(
            "first_seen".to_string(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        let filters = FilterSet {
            criteria: vec![FilterCriterion::DateRange {
                field: "first_seen".to_string(),
                min: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                max: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            }],
        };
        let kept = apply_filters(&[early, late], &filters, &schema()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].identity, "a.com");
    }

    #[test]
    fn empty_collection_filters_to_empty() {
        let filters = FilterSet {
            criteria: vec![range("dr", 0.0, 100.0)],
        };
        let kept = apply_filters(&[], &filters, &schema()).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn unknown_filter_field_fails_even_on_empty_input() {
        let filters = FilterSet {
            criteria: vec![range("spam_score", 0.0, 100.0)],
        };
        let err = apply_filters(&[], &filters, &schema()).unwrap_err();
        assert!(matches!(err, EngineError::FieldNotFound { .. }));
    }

    #[test]
    fn record_missing_the_inspected_value_is_dropped() {
        let bare = Record::new("a.com");
        let filters = FilterSet {
            criteria: vec![range("dr", 0.0, 100.0)],
        };
        let kept = apply_filters(&[bare], &filters, &schema()).unwrap();
        assert!(kept.is_empty());
    }
}
