use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::errors::EngineError;
use crate::models::{FieldKind, Record, RecordSchema, SortDirection, SortKey, SortSpec};

impl SortSpec {
    /// Column-header click behavior: clicking the current primary key flips
    /// its direction; clicking another column makes it the new ascending
    /// primary key instead of appending to the spec.
    pub fn toggle(&mut self, field: &str) {
        match self.keys.first_mut() {
            Some(primary) if primary.field == field => {
                primary.direction = primary.direction.flipped();
            }
            _ => {
                self.keys.retain(|key| key.field != field);
                self.keys.insert(
                    0,
                    SortKey {
                        field: field.to_string(),
                        direction: SortDirection::Ascending,
                    },
                );
            }
        }
    }
}

/// Stable multi-key sort. Records comparing equal under every key keep their
/// relative input order; records missing a key's value sort last regardless
/// of direction. The identity field is always sortable as text, whether or
/// not the schema declares it again as a regular field.
pub fn apply_sort(
    records: &[Record],
    spec: &SortSpec,
    schema: &RecordSchema,
) -> Result<Vec<Record>, EngineError> {
    let mut kinds = Vec::with_capacity(spec.keys.len());
    for key in &spec.keys {
        kinds.push(resolve_key(schema, &key.field)?);
    }

    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        for (key, kind) in spec.keys.iter().zip(&kinds) {
            let ordering = compare_by_key(a, b, key, *kind);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(sorted)
}

#[derive(Clone, Copy)]
enum KeyKind {
    Identity,
    Declared(FieldKind),
}

fn resolve_key(schema: &RecordSchema, field: &str) -> Result<KeyKind, EngineError> {
    if field == schema.identity_field {
        return Ok(KeyKind::Identity);
    }
    schema
        .kind_of(field)
        .map(KeyKind::Declared)
        .ok_or_else(|| EngineError::FieldNotFound {
            field: field.to_string(),
        })
}

enum SortValue<'r> {
    Number(f64),
    Text(&'r str),
    Toggle(bool),
    Date(NaiveDate),
}

fn sort_value<'r>(record: &'r Record, field: &str, kind: KeyKind) -> Option<SortValue<'r>> {
    match kind {
        KeyKind::Identity => Some(SortValue::Text(record.identity.as_str())),
        KeyKind::Declared(FieldKind::Numeric) => {
            record.numeric.get(field).map(|v| SortValue::Number(*v))
        }
        KeyKind::Declared(FieldKind::Categorical) => record
            .categories
            .get(field)
            .map(|v| SortValue::Text(v.as_str())),
        KeyKind::Declared(FieldKind::Flag) => {
            record.flags.get(field).map(|v| SortValue::Toggle(*v))
        }
        KeyKind::Declared(FieldKind::Timestamp) => {
            record.dates.get(field).map(|v| SortValue::Date(*v))
        }
    }
}

fn compare_by_key(a: &Record, b: &Record, key: &SortKey, kind: KeyKind) -> Ordering {
    let left = sort_value(a, &key.field, kind);
    let right = sort_value(b, &key.field, kind);
    match (left, right) {
        (None, None) => Ordering::Equal,
        // missing values sink to the end in both directions
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = compare_values(&left, &right);
            match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_values(left: &SortValue<'_>, right: &SortValue<'_>) -> Ordering {
    match (left, right) {
        (SortValue::Number(l), SortValue::Number(r)) => {
            l.partial_cmp(r).unwrap_or(Ordering::Equal)
        }
        (SortValue::Text(l), SortValue::Text(r)) => l.to_lowercase().cmp(&r.to_lowercase()),
        (SortValue::Toggle(l), SortValue::Toggle(r)) => l.cmp(r),
        (SortValue::Date(l), SortValue::Date(r)) => l.cmp(r),
        // kinds are uniform per field, mixed pairs cannot occur
        _ => Ordering::Equal,
    }
}
