use crate::errors::EngineError;
use crate::models::{BenchmarkComparison, Severity, Thresholds};

/// Compares a subject metric against one baseline value.
///
/// `gap = baseline - subject`, so a positive gap means the subject trails
/// the baseline. `gap_percent` is taken against the raw baseline (display
/// rounding belongs to the presentation layer) and is 0 when the baseline
/// itself is 0.
pub fn compare(
    metric: &str,
    subject_value: f64,
    baseline_value: f64,
    thresholds: &Thresholds,
) -> BenchmarkComparison {
    let gap = baseline_value - subject_value;
    let gap_percent = if baseline_value == 0.0 {
        0.0
    } else {
        100.0 * gap / baseline_value
    };

    BenchmarkComparison {
        metric: metric.to_string(),
        subject_value,
        baseline_value,
        gap,
        gap_percent,
        severity: classify(gap_percent, thresholds),
    }
}

/// Compares a subject against the arithmetic mean of competitor values.
pub fn compare_against_competitors(
    metric: &str,
    subject_value: f64,
    competitors: &[f64],
    thresholds: &Thresholds,
) -> Result<BenchmarkComparison, EngineError> {
    let baseline = competitor_mean(metric, competitors)?;
    Ok(compare(metric, subject_value, baseline, thresholds))
}

pub fn competitor_mean(metric: &str, competitors: &[f64]) -> Result<f64, EngineError> {
    if competitors.is_empty() {
        return Err(EngineError::EmptyBaselineSet {
            metric: metric.to_string(),
        });
    }
    Ok(competitors.iter().sum::<f64>() / competitors.len() as f64)
}

fn classify(gap_percent: f64, thresholds: &Thresholds) -> Severity {
    let magnitude = gap_percent.abs();
    if magnitude >= thresholds.danger {
        Severity::Danger
    } else if magnitude >= thresholds.warning {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
