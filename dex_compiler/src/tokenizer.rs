//! Line classification for PBS-style data files.
//!
//! A `#-` comment line separates records, any other `#` line is a comment,
//! `[...]` supplies a key or index, and `Name = Value` populates a field.

use dex_data::RecordKind;

use crate::CompileError;

const COMMENT: char = '#';
const DELIMITER: &str = "#-";

/// One meaningful line of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Flush the current record and start a new one.
    Delimiter,
    /// Interior of a `[...]` header, trimmed.
    Bracket(&'a str),
    /// `name = value`, both sides trimmed.
    Field { name: &'a str, value: &'a str },
}

/// A classified line plus its 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLine<'a> {
    pub number: usize,
    pub line: Line<'a>,
}

/// Classify every meaningful line of `text`.
///
/// # Errors
/// - `MalformedLine` for a line that is neither a comment, header, nor `name = value`
pub fn tokenize(kind: RecordKind, text: &str) -> Result<Vec<TokenLine<'_>>, CompileError> {
    let mut out = Vec::new();
    for (number, raw) in content_lines(text) {
        let line = if raw.starts_with(DELIMITER) {
            Line::Delimiter
        } else if raw.starts_with(COMMENT) {
            continue;
        } else if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Line::Bracket(inner.trim())
        } else if let Some((name, value)) = raw.split_once('=') {
            Line::Field {
                name: name.trim(),
                value: value.trim(),
            }
        } else {
            return Err(CompileError::MalformedLine {
                kind,
                line: number,
                text: raw.to_string(),
                message: "expected '[key]' or 'name = value'",
            });
        };
        out.push(TokenLine { number, line });
    }
    Ok(out)
}

/// Non-empty, non-comment lines with their 1-based numbers, trimmed.
pub fn data_rows(text: &str) -> impl Iterator<Item = (usize, &str)> {
    content_lines(text).filter(|(_, line)| !line.starts_with(COMMENT))
}

fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}
