use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};

use linklens::dataset::{self, CsvSource, JsonSource, RecordSource};
use linklens::report::{self, ReportProfile};
use linklens::{
    benchmark, AggregationMetric, AggregationSpec, FieldKind, FilterCriterion, FilterSet,
    PageRequest, Record, RecordSchema, SortDirection, SortKey, SortSpec, QueryState,
    ThresholdTable,
};

#[derive(Parser)]
#[command(name = "linklens")]
#[command(about = "Backlink profile query and benchmark engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a demo schema, dataset, query, and report profile
    Sample {
        #[arg(long, default_value = "demo")]
        dir: PathBuf,
    },
    /// Filter, sort, and page through a record collection
    Query {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        data: PathBuf,
        /// JSON query state (filters, sort, page); defaults to everything
        #[arg(long)]
        query: Option<PathBuf>,
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        page_size: Option<usize>,
        /// Toggle the sort on this column before running
        #[arg(long)]
        sort_by: Option<String>,
    },
    /// Group records by a categorical field
    Summary {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        group_by: String,
        /// What to show per group: 'count' or 'percentage'
        #[arg(long, default_value = "percentage")]
        metric: String,
    },
    /// Compare a subject metric against a baseline or competitor values
    #[command(group(
        ArgGroup::new("baseline_source")
            .args(["baseline", "competitors"])
            .required(true)
            .multiple(false)
    ))]
    Gap {
        #[arg(long)]
        metric: String,
        #[arg(long)]
        subject: f64,
        #[arg(long)]
        baseline: Option<f64>,
        #[arg(long, value_delimiter = ',')]
        competitors: Option<Vec<f64>>,
        /// JSON threshold table keyed by metric name
        #[arg(long)]
        thresholds: Option<PathBuf>,
    },
    /// Generate a markdown link-profile report
    Report {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        profile: PathBuf,
        #[arg(long)]
        thresholds: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sample { dir } => {
            write_sample_files(&dir)?;
            println!("Sample files written to {}.", dir.display());
        }
        Commands::Query {
            schema,
            data,
            query,
            page,
            page_size,
            sort_by,
        } => {
            let schema = load_schema(&schema)?;
            let records = load_records(&data, &schema)?;

            let mut state: QueryState = match query {
                Some(path) => dataset::read_json(&path)
                    .with_context(|| format!("failed to read query from {}", path.display()))?,
                None => QueryState::default(),
            };
            if let Some(field) = sort_by {
                state.toggle_sort(&field);
            }
            if let Some(size) = page_size {
                state.set_page_size(size);
            }
            if let Some(number) = page {
                state.set_page(number);
            }

            let result = state.execute(&records, &schema)?;
            println!(
                "Page {} of {} ({} matching records):",
                result.page_number, result.total_pages, result.total_items
            );
            for record in &result.items {
                println!("- {}", describe(record, &schema));
            }
        }
        Commands::Summary {
            schema,
            data,
            group_by,
            metric,
        } => {
            let schema = load_schema(&schema)?;
            let records = load_records(&data, &schema)?;
            let spec = AggregationSpec {
                group_by,
                metric: parse_metric(&metric)?,
            };
            let buckets = linklens::aggregate::aggregate(&records, &spec, &schema)?;

            if buckets.is_empty() {
                println!("No records to summarize.");
                return Ok(());
            }
            for bucket in &buckets {
                let value = linklens::aggregate::metric_value(bucket, spec.metric);
                match spec.metric {
                    AggregationMetric::Count => {
                        println!("- {}: {:.0} records", bucket.label, value)
                    }
                    AggregationMetric::PercentageOfTotal => {
                        println!("- {}: {:.1}%", bucket.label, value)
                    }
                }
            }
        }
        Commands::Gap {
            metric,
            subject,
            baseline,
            competitors,
            thresholds,
        } => {
            let table = load_thresholds(thresholds.as_deref())?;
            let comparison = match (baseline, competitors) {
                (Some(baseline), _) => {
                    benchmark::compare(&metric, subject, baseline, &table.get(&metric))
                }
                (None, Some(competitors)) => benchmark::compare_against_competitors(
                    &metric,
                    subject,
                    &competitors,
                    &table.get(&metric),
                )?,
                // clap's baseline_source group guarantees one of the two
                (None, None) => unreachable!(),
            };
            println!(
                "{}: subject {:.1} vs baseline {:.1} -> gap {:.1} ({:.1}%) [{}]",
                comparison.metric,
                comparison.subject_value,
                comparison.baseline_value,
                comparison.gap,
                comparison.gap_percent,
                comparison.severity
            );
        }
        Commands::Report {
            schema,
            data,
            profile,
            thresholds,
            out,
        } => {
            let schema = load_schema(&schema)?;
            let records = load_records(&data, &schema)?;
            let profile: ReportProfile = dataset::read_json(&profile)
                .with_context(|| format!("failed to read profile from {}", profile.display()))?;
            let table = load_thresholds(thresholds.as_deref())?;

            let rendered = report::build_report(&profile, &schema, &records, &table)?;
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_schema(path: &Path) -> anyhow::Result<RecordSchema> {
    dataset::read_json(path)
        .with_context(|| format!("failed to read schema from {}", path.display()))
}

fn load_records(path: &Path, schema: &RecordSchema) -> anyhow::Result<Vec<Record>> {
    let records = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => JsonSource::new(path).fetch(),
        _ => CsvSource::new(path, schema.clone()).fetch(),
    };
    records.with_context(|| format!("failed to load records from {}", path.display()))
}

fn parse_metric(raw: &str) -> anyhow::Result<AggregationMetric> {
    match raw {
        "count" => Ok(AggregationMetric::Count),
        "percentage" | "percentage_of_total" => Ok(AggregationMetric::PercentageOfTotal),
        other => anyhow::bail!("unknown metric '{other}', expected 'count' or 'percentage'"),
    }
}

fn load_thresholds(path: Option<&Path>) -> anyhow::Result<ThresholdTable> {
    match path {
        Some(path) => dataset::read_json(path)
            .with_context(|| format!("failed to read thresholds from {}", path.display())),
        None => Ok(ThresholdTable::default()),
    }
}

/// One table row: the identity plus every declared field the record carries,
/// in schema order.
fn describe(record: &Record, schema: &RecordSchema) -> String {
    let mut parts = vec![record.identity.clone()];
    for (field, kind) in &schema.fields {
        let rendered = match kind {
            FieldKind::Numeric => record.numeric.get(field).map(|v| format!("{field}={v}")),
            FieldKind::Categorical => record.categories.get(field).map(|v| format!("{field}={v}")),
            FieldKind::Flag => record.flags.get(field).map(|v| format!("{field}={v}")),
            FieldKind::Timestamp => record.dates.get(field).map(|v| format!("{field}={v}")),
        };
        if let Some(rendered) = rendered {
            parts.push(rendered);
        }
    }
    parts.join(" ")
}

fn write_sample_files(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut fields = BTreeMap::new();
    fields.insert("dr".to_string(), FieldKind::Numeric);
    fields.insert("traffic".to_string(), FieldKind::Numeric);
    fields.insert("backlinks".to_string(), FieldKind::Numeric);
    fields.insert("rel_type".to_string(), FieldKind::Categorical);
    fields.insert("placement".to_string(), FieldKind::Categorical);
    fields.insert("toxic".to_string(), FieldKind::Flag);
    fields.insert("first_seen".to_string(), FieldKind::Timestamp);
    let schema = RecordSchema {
        identity_field: "domain".to_string(),
        fields,
    };
    std::fs::write(
        dir.join("schema.json"),
        serde_json::to_string_pretty(&schema)?,
    )?;

    let csv = "\
domain,dr,traffic,backlinks,rel_type,placement,toxic,first_seen
techdaily.io,78,125000,340,dofollow,content,false,2025-03-12
seo-insights.com,66,48000,120,dofollow,content,false,2025-06-02
linkfarm.biz,12,300,2100,dofollow,footer,true,2026-01-08
newsroom.example.org,84,410000,95,nofollow,content,false,2024-11-19
blogring.net,31,8700,64,ugc,sidebar,false,2025-09-27
promo-hub.co,22,1500,480,sponsored,footer,true,2025-12-14
devforum.dev,59,72000,210,ugc,content,false,2025-05-30
citywire.press,71,96000,150,dofollow,content,false,2026-02-21
castaway.media,45,21000,88,nofollow,sidebar,false,2025-08-04
rankbooster.xyz,9,120,3600,dofollow,footer,true,2026-03-15
";
    std::fs::write(dir.join("links.csv"), csv)?;

    let query = QueryState {
        filters: FilterSet {
            criteria: vec![FilterCriterion::Range {
                field: "dr".to_string(),
                min: 20.0,
                max: 100.0,
            }],
        },
        sort: SortSpec {
            keys: vec![SortKey {
                field: "dr".to_string(),
                direction: SortDirection::Descending,
            }],
        },
        page: PageRequest {
            page_number: 1,
            page_size: 10,
        },
    };
    std::fs::write(
        dir.join("query.json"),
        serde_json::to_string_pretty(&query)?,
    )?;

    let profile = ReportProfile {
        title: "Link Profile Report".to_string(),
        distributions: vec!["rel_type".to_string(), "placement".to_string()],
        benchmarks: vec![report::BenchmarkEntry {
            metric: "referring_domains".to_string(),
            subject: 250.0,
            competitors: vec![310.0, 340.0, 460.0],
        }],
    };
    std::fs::write(
        dir.join("profile.json"),
        serde_json::to_string_pretty(&profile)?,
    )?;

    Ok(())
}
