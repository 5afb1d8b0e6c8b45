//! linklens: a faceted filter/sort/paginate/aggregate engine for backlink
//! and referring-domain analysis, plus gap/benchmark comparisons against
//! competitor baselines.
//!
//! The engine is pure and synchronous: every operation recomputes from a
//! caller-supplied record snapshot and mutates nothing. Presentation layers
//! (tables, charts, warning banners) consume `PageResult`,
//! `AggregationResult`, and `BenchmarkComparison` values.

/// Categorical grouping with counts and percentage shares.
pub mod aggregate;
/// Gap computation and severity classification against baselines.
pub mod benchmark;
/// Record sources: CSV, JSON, and in-memory fixtures.
pub mod dataset;
mod errors;
/// Multi-facet AND filtering.
pub mod filter;
/// Engine data model: records, schemas, and the filter/sort/page specs.
pub mod models;
/// Fixed-size page slicing.
pub mod page;
/// Stateful filter + sort + page composition for one analysis table.
pub mod query;
/// Schema-checked field accessors.
pub mod record;
/// Markdown link-profile reports.
pub mod report;
/// Stable multi-key ordering with click-to-toggle direction.
pub mod sort;

pub use errors::EngineError;
pub use models::{
    AggregationMetric, AggregationResult, AggregationSpec, BenchmarkComparison, FieldKind,
    FilterCriterion, FilterSet, GroupBucket, PageRequest, PageResult, Record, RecordSchema,
    Severity, SortDirection, SortKey, SortSpec, Thresholds, ThresholdTable,
};
pub use query::QueryState;
