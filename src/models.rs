use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The type a named field carries on every record of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Categorical,
    Flag,
    Timestamp,
}

/// Page-scoped declaration of the fields a record collection carries.
///
/// Filter, sort, and aggregation specs are resolved against this schema;
/// referencing an undeclared field is a configuration error, not a skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSchema {
    pub identity_field: String,
    pub fields: BTreeMap<String, FieldKind>,
}

impl RecordSchema {
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }
}

/// One backlink or referring-domain entity.
///
/// `identity` is the URL or domain string, unique within a collection
/// snapshot. A record may omit a value for a declared field; missing values
/// sort last and aggregate under the `"unknown"` bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub identity: String,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    #[serde(default)]
    pub categories: HashMap<String, String>,
    #[serde(default)]
    pub flags: HashMap<String, bool>,
    #[serde(default)]
    pub dates: HashMap<String, NaiveDate>,
}

impl Record {
    pub fn new(identity: impl Into<String>) -> Self {
        Record {
            identity: identity.into(),
            numeric: HashMap::new(),
            categories: HashMap::new(),
            flags: HashMap::new(),
            dates: HashMap::new(),
        }
    }
}

/// One facet of a filter bar. Criteria combine with AND semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterCriterion {
    /// Inclusive numeric range, matching slider-based DR/traffic filters.
    Range { field: String, min: f64, max: f64 },
    /// Inclusive date range over a timestamp field.
    DateRange {
        field: String,
        min: NaiveDate,
        max: NaiveDate,
    },
    /// Set membership over a categorical field. An empty `allowed` set
    /// matches everything (the "all" dropdown default).
    Set {
        field: String,
        allowed: BTreeSet<String>,
    },
    /// Exact boolean match on a flag field.
    Flag { field: String, expected: bool },
    /// Case-insensitive containment against the record identity, or against
    /// a designated categorical field when `field` is set.
    Substring {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        needle: String,
    },
}

/// Ordered list of criteria, all of which must pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    pub criteria: Vec<FilterCriterion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Lexicographic comparator spec: the first key orders, later keys break ties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    pub keys: Vec<SortKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page_number")]
    pub page_number: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_number() -> usize {
    1
}

fn default_page_size() -> usize {
    25
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub total_pages: usize,
    pub page_number: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMetric {
    Count,
    PercentageOfTotal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub group_by: String,
    pub metric: AggregationMetric,
}

/// One bucket of an aggregation, carrying both the count and the rounded
/// share so chart and table consumers read the same row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBucket {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

pub type AggregationResult = Vec<GroupBucket>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Warning,
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "ok"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

/// Severity cut-offs for one metric, expressed as absolute gap percentages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f64,
    pub danger: f64,
}

/// Per-metric threshold configuration. Pages hardcoded their own cut-offs in
/// the source product; here they live in one table keyed by metric name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    pub metrics: BTreeMap<String, Thresholds>,
}

impl ThresholdTable {
    /// Fallback applied to metrics absent from the table.
    pub const FALLBACK: Thresholds = Thresholds {
        warning: 15.0,
        danger: 30.0,
    };

    pub fn get(&self, metric: &str) -> Thresholds {
        self.metrics.get(metric).copied().unwrap_or(Self::FALLBACK)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "referring_domains".to_string(),
            Thresholds {
                warning: 15.0,
                danger: 30.0,
            },
        );
        metrics.insert(
            "backlinks".to_string(),
            Thresholds {
                warning: 15.0,
                danger: 30.0,
            },
        );
        metrics.insert(
            "anchor_exact_match".to_string(),
            Thresholds {
                warning: 2.0,
                danger: 5.0,
            },
        );
        metrics.insert(
            "toxic_share".to_string(),
            Thresholds {
                warning: 10.0,
                danger: 20.0,
            },
        );
        ThresholdTable { metrics }
    }
}

/// Outcome of comparing a subject metric against a baseline. A positive gap
/// means the subject trails the baseline.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkComparison {
    pub metric: String,
    pub subject_value: f64,
    pub baseline_value: f64,
    pub gap: f64,
    pub gap_percent: f64,
    pub severity: Severity,
}
