//! Table-driven field population.
//!
//! Each record kind registers a static table mapping field names to free
//! update functions, plus a bracket rule and a completion rule. Records are
//! built by replaying their pending lines through that table in file order.

use std::collections::HashMap;

use dex_data::RecordKind;

use crate::error::{CompileError, FieldError};
use crate::tokenizer::Line;
use crate::version::FormatVersion;

/// Update rule for one recognized field.
pub type FieldRule<R> = fn(&FormatVersion, &mut R, &str) -> Result<(), FieldError>;

/// Field name → update rule, built once per record kind.
pub type RuleTable<R> = HashMap<&'static str, FieldRule<R>>;

/// A record kind that can be populated by the dispatcher.
pub trait RecordSchema: Default + 'static {
    const KIND: RecordKind;

    fn rules() -> &'static RuleTable<Self>;

    /// Apply the interior of a `[...]` header line.
    fn bracket(_version: &FormatVersion, _record: &mut Self, _interior: &str) -> Result<(), FieldError> {
        Ok(())
    }

    /// Runs once after the last field.
    fn finish(_version: &FormatVersion, _record: &mut Self) -> Result<(), FieldError> {
        Ok(())
    }

    fn key(&self) -> &str;
}

/// Build one record from its pending lines.
///
/// Unrecognized field names are skipped. `end_line` is only used to locate
/// records that never received a key.
///
/// # Errors
/// - `MalformedField` when a rule rejects its value
/// - `MissingKey` when the completed record has an empty key
pub fn build_record<R: RecordSchema>(
    version: &FormatVersion,
    pending: &[Line<'_>],
    end_line: usize,
) -> Result<R, CompileError> {
    let rules = R::rules();
    let mut record = R::default();
    for line in pending {
        match *line {
            Line::Bracket(interior) => {
                R::bracket(version, &mut record, interior).map_err(|e| field_error(&record, "[]", interior, e))?;
            },
            Line::Field { name, value } => {
                if let Some(rule) = rules.get(name) {
                    rule(version, &mut record, value).map_err(|e| field_error(&record, name, value, e))?;
                }
            },
            Line::Delimiter => {},
        }
    }
    R::finish(version, &mut record).map_err(|e| field_error(&record, "(completion)", "", e))?;
    if record.key().trim().is_empty() {
        return Err(CompileError::MissingKey {
            kind: R::KIND,
            line: end_line,
        });
    }
    Ok(record)
}

fn field_error<R: RecordSchema>(record: &R, field: &str, value: &str, err: FieldError) -> CompileError {
    let key = record.key();
    CompileError::MalformedField {
        kind: R::KIND,
        key: if key.is_empty() { "<unkeyed>".to_string() } else { key.to_string() },
        field: field.to_string(),
        value: value.to_string(),
        reason: err.to_string(),
    }
}
