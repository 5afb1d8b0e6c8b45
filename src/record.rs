use crate::errors::EngineError;
use crate::models::{FieldKind, Record, RecordSchema};
use chrono::NaiveDate;

/// Checks that `field` is declared with the expected kind in the schema.
/// A mismatch is a page misconfiguration and fails fast.
pub fn require_field(
    schema: &RecordSchema,
    field: &str,
    kind: FieldKind,
) -> Result<(), EngineError> {
    match schema.kind_of(field) {
        Some(declared) if declared == kind => Ok(()),
        _ => Err(EngineError::FieldNotFound {
            field: field.to_string(),
        }),
    }
}

/// Numeric value of `field`, `None` when the record omits it.
pub fn numeric_value(
    schema: &RecordSchema,
    record: &Record,
    field: &str,
) -> Result<Option<f64>, EngineError> {
    require_field(schema, field, FieldKind::Numeric)?;
    Ok(record.numeric.get(field).copied())
}

/// Categorical label of `field`.
pub fn category_value<'r>(
    schema: &RecordSchema,
    record: &'r Record,
    field: &str,
) -> Result<Option<&'r str>, EngineError> {
    require_field(schema, field, FieldKind::Categorical)?;
    Ok(record.categories.get(field).map(String::as_str))
}

/// Boolean flag value of `field`.
pub fn flag_value(
    schema: &RecordSchema,
    record: &Record,
    field: &str,
) -> Result<Option<bool>, EngineError> {
    require_field(schema, field, FieldKind::Flag)?;
    Ok(record.flags.get(field).copied())
}

/// Date value of `field`.
pub fn date_value(
    schema: &RecordSchema,
    record: &Record,
    field: &str,
) -> Result<Option<NaiveDate>, EngineError> {
    require_field(schema, field, FieldKind::Timestamp)?;
    Ok(record.dates.get(field).copied())
}
