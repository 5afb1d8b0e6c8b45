use std::collections::HashMap;

use crate::errors::EngineError;
use crate::models::{
    AggregationMetric, AggregationResult, AggregationSpec, FieldKind, GroupBucket, Record,
    RecordSchema,
};
use crate::record;

/// Bucket label applied to records that omit the group-by field.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Groups records by the categorical value of `spec.group_by` and reports
/// per-group counts and shares. Buckets come back largest first, ties broken
/// by label, so chart segments render in a deterministic order.
pub fn aggregate(
    records: &[Record],
    spec: &AggregationSpec,
    schema: &RecordSchema,
) -> Result<AggregationResult, EngineError> {
    record::require_field(schema, &spec.group_by, FieldKind::Categorical)?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let label = record
            .categories
            .get(&spec.group_by)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        *counts.entry(label).or_insert(0) += 1;
    }

    let total = records.len();
    let mut buckets: Vec<GroupBucket> = counts
        .into_iter()
        .map(|(label, count)| GroupBucket {
            label,
            count,
            percentage: share_of(count, total),
        })
        .collect();

    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    Ok(buckets)
}

/// The number a consumer should chart for `bucket` under the chosen metric:
/// the raw group count, or its percentage share of the total.
pub fn metric_value(bucket: &GroupBucket, metric: AggregationMetric) -> f64 {
    match metric {
        AggregationMetric::Count => bucket.count as f64,
        AggregationMetric::PercentageOfTotal => bucket.percentage,
    }
}

/// Percentage of `count` over `total`, rounded to one decimal. Zero totals
/// yield 0.0 rather than NaN.
fn share_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * count as f64 / total as f64;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn schema() -> RecordSchema {
        let mut fields = BTreeMap::new();
        fields.insert("rel_type".to_string(), FieldKind::Categorical);
        RecordSchema {
            identity_field: "url".to_string(),
            fields,
        }
    }

    fn spec() -> AggregationSpec {
        AggregationSpec {
            group_by: "rel_type".to_string(),
            metric: AggregationMetric::Count,
        }
    }

    fn record(url: &str, rel_type: Option<&str>) -> Record {
        let mut r = Record::new(url);
        if let Some(rel_type) = rel_type {
            r.categories
                .insert("rel_type".to_string(), rel_type.to_string());
        }
        r
    }

    #[test]
    fn counts_and_percentages_per_group() {
        let records = vec![
            record("a", Some("dofollow")),
            record("b", Some("dofollow")),
            record("c", Some("nofollow")),
            record("d", Some("ugc")),
        ];
        let buckets = aggregate(&records, &spec(), &schema()).unwrap();
        assert_eq!(
            buckets,
            vec![
                GroupBucket {
                    label: "dofollow".to_string(),
                    count: 2,
                    percentage: 50.0,
                },
                GroupBucket {
                    label: "nofollow".to_string(),
                    count: 1,
                    percentage: 25.0,
                },
                GroupBucket {
                    label: "ugc".to_string(),
                    count: 1,
                    percentage: 25.0,
                },
            ]
        );
    }

    #[test]
    fn missing_values_bucket_as_unknown() {
        let records = vec![record("a", Some("dofollow")), record("b", None)];
        let buckets = aggregate(&records, &spec(), &schema()).unwrap();
        assert!(buckets.iter().any(|b| b.label == UNKNOWN_LABEL && b.count == 1));
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let buckets = aggregate(&[], &spec(), &schema()).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn percentages_round_to_one_decimal_and_sum_near_100() {
        let records = vec![
            record("a", Some("dofollow")),
            record("b", Some("nofollow")),
            record("c", Some("ugc")),
        ];
        let buckets = aggregate(&records, &spec(), &schema()).unwrap();
        for bucket in &buckets {
            assert_eq!(bucket.percentage, 33.3);
        }
        let total: f64 = buckets.iter().map(|b| b.percentage).sum();
        assert!((total - 100.0).abs() <= 0.1);
    }

    #[test]
    fn metric_selects_the_charted_value() {
        let bucket = GroupBucket {
            label: "dofollow".to_string(),
            count: 2,
            percentage: 50.0,
        };
        assert_eq!(metric_value(&bucket, AggregationMetric::Count), 2.0);
        assert_eq!(
            metric_value(&bucket, AggregationMetric::PercentageOfTotal),
            50.0
        );
    }

    #[test]
    fn grouping_by_non_categorical_field_fails() {
        let bad = AggregationSpec {
            group_by: "url".to_string(),
            metric: AggregationMetric::PercentageOfTotal,
        };
        let err = aggregate(&[], &bad, &schema()).unwrap_err();
        assert!(matches!(err, EngineError::FieldNotFound { .. }));
    }
}
