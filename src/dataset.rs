use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::errors::EngineError;
use crate::models::{FieldKind, Record, RecordSchema};

/// Where a page gets its record snapshot from. The engine itself never does
/// I/O; callers hand it whatever a source produced.
pub trait RecordSource {
    fn fetch(&self) -> Result<Vec<Record>, EngineError>;
}

/// Fixture-friendly source backed by an owned vector.
pub struct InMemorySource {
    records: Vec<Record>,
}

impl InMemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        InMemorySource { records }
    }
}

impl RecordSource for InMemorySource {
    fn fetch(&self) -> Result<Vec<Record>, EngineError> {
        ensure_unique_identities(&self.records)?;
        Ok(self.records.clone())
    }
}

/// CSV-backed source. Column typing is driven by the record schema: the
/// identity column is named by `identity_field`, declared columns parse
/// according to their kind, and columns absent from the schema are ignored.
/// An empty cell counts as a missing value, not a parse failure.
pub struct CsvSource {
    path: PathBuf,
    schema: RecordSchema,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, schema: RecordSchema) -> Self {
        CsvSource {
            path: path.into(),
            schema,
        }
    }
}

impl RecordSource for CsvSource {
    fn fetch(&self) -> Result<Vec<Record>, EngineError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let identity_index = headers
            .iter()
            .position(|h| h == self.schema.identity_field)
            .ok_or_else(|| EngineError::MalformedValue {
                column: self.schema.identity_field.clone(),
                row: 0,
                message: "identity column missing from CSV header".to_string(),
            })?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            // header is line 1
            let line = index + 2;

            let identity = row.get(identity_index).unwrap_or("").trim();
            if identity.is_empty() {
                return Err(EngineError::MalformedValue {
                    column: self.schema.identity_field.clone(),
                    row: line,
                    message: "empty identity value".to_string(),
                });
            }

            let mut record = Record::new(identity);
            for (column_index, header) in headers.iter().enumerate() {
                // the identity column may double as a declared field
                let Some(kind) = self.schema.kind_of(header) else {
                    continue;
                };
                let cell = row.get(column_index).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                parse_cell(&mut record, header, kind, cell, line)?;
            }
            records.push(record);
        }

        ensure_unique_identities(&records)?;
        Ok(records)
    }
}

/// JSON-backed source holding an array of records in the engine's own shape.
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonSource { path: path.into() }
    }
}

impl RecordSource for JsonSource {
    fn fetch(&self) -> Result<Vec<Record>, EngineError> {
        let records: Vec<Record> = read_json(&self.path)?;
        ensure_unique_identities(&records)?;
        Ok(records)
    }
}

/// Reads any serde-deserializable configuration file (schema, query,
/// threshold table, report profile).
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EngineError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn parse_cell(
    record: &mut Record,
    column: &str,
    kind: FieldKind,
    cell: &str,
    line: usize,
) -> Result<(), EngineError> {
    match kind {
        FieldKind::Numeric => {
            let value = cell.parse::<f64>().map_err(|e| EngineError::MalformedValue {
                column: column.to_string(),
                row: line,
                message: e.to_string(),
            })?;
            record.numeric.insert(column.to_string(), value);
        }
        FieldKind::Categorical => {
            record
                .categories
                .insert(column.to_string(), cell.to_string());
        }
        FieldKind::Flag => {
            let value = match cell.to_lowercase().as_str() {
                "true" | "yes" | "1" => true,
                "false" | "no" | "0" => false,
                other => {
                    return Err(EngineError::MalformedValue {
                        column: column.to_string(),
                        row: line,
                        message: format!("'{other}' is not a boolean"),
                    })
                }
            };
            record.flags.insert(column.to_string(), value);
        }
        FieldKind::Timestamp => {
            let value = cell
                .parse::<chrono::NaiveDate>()
                .map_err(|e| EngineError::MalformedValue {
                    column: column.to_string(),
                    row: line,
                    message: e.to_string(),
                })?;
            record.dates.insert(column.to_string(), value);
        }
    }
    Ok(())
}

fn ensure_unique_identities(records: &[Record]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.identity.as_str()) {
            return Err(EngineError::DuplicateIdentity {
                identity: record.identity.clone(),
            });
        }
    }
    Ok(())
}
