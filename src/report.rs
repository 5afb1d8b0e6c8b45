use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::benchmark;
use crate::errors::EngineError;
use crate::models::{
    AggregationMetric, AggregationSpec, FieldKind, Record, RecordSchema, ThresholdTable,
};

/// Declarative description of one link-profile report: which categorical
/// fields to break down and which metrics to benchmark against competitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProfile {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub distributions: Vec<String>,
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkEntry {
    pub metric: String,
    pub subject: f64,
    pub competitors: Vec<f64>,
}

fn default_title() -> String {
    "Link Profile Report".to_string()
}

pub fn build_report(
    profile: &ReportProfile,
    schema: &RecordSchema,
    records: &[Record],
    thresholds: &ThresholdTable,
) -> Result<String, EngineError> {
    let mut output = String::new();

    let _ = writeln!(output, "# {}", profile.title);
    let _ = writeln!(output, "{} records analyzed.", records.len());

    for field in &profile.distributions {
        let spec = AggregationSpec {
            group_by: field.clone(),
            metric: AggregationMetric::PercentageOfTotal,
        };
        let buckets = aggregate::aggregate(records, &spec, schema)?;

        let _ = writeln!(output);
        let _ = writeln!(output, "## Breakdown by {field}");
        if buckets.is_empty() {
            let _ = writeln!(output, "No records in this snapshot.");
        } else {
            for bucket in &buckets {
                let _ = writeln!(
                    output,
                    "- {}: {} links ({:.1}%)",
                    bucket.label, bucket.count, bucket.percentage
                );
            }
        }
    }

    let flag_fields: Vec<&String> = schema
        .fields
        .iter()
        .filter(|(_, kind)| **kind == FieldKind::Flag)
        .map(|(name, _)| name)
        .collect();
    if !flag_fields.is_empty() && !records.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Flagged links");
        for field in flag_fields {
            let raised = records
                .iter()
                .filter(|r| r.flags.get(field).copied().unwrap_or(false))
                .count();
            let share = 100.0 * raised as f64 / records.len() as f64;
            let _ = writeln!(output, "- {}: {} of {} ({:.1}%)", field, raised, records.len(), share);
        }
    }

    if !profile.benchmarks.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Benchmarks");
        for entry in &profile.benchmarks {
            let comparison = benchmark::compare_against_competitors(
                &entry.metric,
                entry.subject,
                &entry.competitors,
                &thresholds.get(&entry.metric),
            )?;
            let _ = writeln!(
                output,
                "- {}: {:.0} vs competitor avg {:.1}, gap {:.1} ({:.1}%) [{}]",
                comparison.metric,
                comparison.subject_value,
                comparison.baseline_value,
                comparison.gap,
                comparison.gap_percent,
                comparison.severity
            );
        }
    }

    Ok(output)
}
