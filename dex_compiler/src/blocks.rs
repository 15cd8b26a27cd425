//! Record block strategies: delimiter-separated blocks and one-record-per-line lists.

use dex_data::{Pokemon, RecordKind, RecordMap, Type};
use log::{debug, warn};

use crate::CompileError;
use crate::dispatch::{RecordSchema, build_record};
use crate::schema::PositionalSchema;
use crate::tokenizer::{Line, data_rows, tokenize};
use crate::version::FormatVersion;

/// Parse `#-`-delimited record blocks into `into`, returning how many were read.
///
/// Later records overwrite earlier ones with the same key, keeping the
/// original position.
///
/// # Errors
/// - malformed lines, malformed field values, or records without a key
pub fn parse_standard<R: RecordSchema>(
    version: &FormatVersion,
    text: &str,
    into: &mut RecordMap<R>,
) -> Result<usize, CompileError> {
    let mut pending: Vec<Line<'_>> = Vec::new();
    let mut count = 0;
    let mut last_line = 0;
    for token in tokenize(R::KIND, text)? {
        last_line = token.number;
        match token.line {
            Line::Delimiter => {
                if !pending.is_empty() {
                    let record = build_record::<R>(version, &pending, token.number)?;
                    store(into, record);
                    count += 1;
                    pending.clear();
                }
            },
            line => pending.push(line),
        }
    }
    if !pending.is_empty() {
        let record = build_record::<R>(version, &pending, last_line)?;
        store(into, record);
        count += 1;
    }
    debug!("parsed {count} {} records", R::KIND);
    Ok(count)
}

/// Parse one record per line, feeding comma-separated segments to the
/// dispatcher under their zero-based position as field name.
///
/// # Errors
/// - malformed field values or records without a key
pub fn parse_newline_comma<R: PositionalSchema>(
    version: &FormatVersion,
    text: &str,
    into: &mut RecordMap<R>,
) -> Result<usize, CompileError> {
    let names: Vec<String> = (0..R::POSITIONS).map(|i| i.to_string()).collect();
    let mut count = 0;
    for (number, row) in data_rows(text) {
        let fields: Vec<Line<'_>> = row
            .splitn(R::POSITIONS, ',')
            .zip(&names)
            .map(|(value, name)| Line::Field {
                name: name.as_str(),
                value: value.trim(),
            })
            .collect();
        let record = build_record::<R>(version, &fields, number)?;
        store(into, record);
        count += 1;
    }
    debug!("parsed {count} {} records", R::KIND);
    Ok(count)
}

fn store<R: RecordSchema>(into: &mut RecordMap<R>, record: R) {
    let key = record.key().to_string();
    if into.insert(key.clone(), record).is_some() {
        warn!("{} '{key}' redefined; keeping the later definition", R::KIND);
    }
}

/// Number types and species by their final position across every loaded file.
///
/// Runs after all files of a kind are parsed, so a redefined key keeps the
/// number of its first definition. Formats before
/// [`crate::version::NAMED_BRACKET_CUTOFF`] carry the numbers in their
/// brackets and are left alone.
///
/// # Errors
/// - `MalformedField` when a dex number does not fit in 32 bits
pub fn number_by_position(
    version: &FormatVersion,
    types: &mut RecordMap<Type>,
    pokemon: &mut RecordMap<Pokemon>,
) -> Result<(), CompileError> {
    if !version.uses_named_brackets() {
        return Ok(());
    }
    for (position, ty) in types.values_mut().enumerate() {
        ty.index = position;
    }
    for (position, mon) in pokemon.values_mut().enumerate() {
        mon.id = u32::try_from(position + 1).map_err(|e| CompileError::MalformedField {
            kind: RecordKind::Pokemon,
            key: mon.key.clone(),
            field: "id".to_string(),
            value: (position + 1).to_string(),
            reason: e.to_string(),
        })?;
    }
    debug!("numbered {} types and {} species by position", types.len(), pokemon.len());
    Ok(())
}
