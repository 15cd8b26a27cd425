use std::str::FromStr;

use crate::error::FieldError;

/// Parse a numeric field value.
pub(crate) fn number<T: FromStr>(value: &str) -> Result<T, FieldError> {
    value.trim().parse().map_err(|_| FieldError::NotANumber)
}

/// Split a comma-delimited value into trimmed, non-empty pieces.
pub(crate) fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma-delimited list of numbers.
pub(crate) fn number_list<T: FromStr>(value: &str) -> Result<Vec<T>, FieldError> {
    list(value).iter().map(|v| number(v)).collect()
}

pub(crate) fn boolean(value: &str) -> Result<bool, FieldError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        other => Err(FieldError::Invalid(format!("expected true or false, found '{other}'"))),
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub(crate) fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

/// Group a flat list into consecutive pairs, rejecting a dangling element.
pub(crate) fn pairs(value: &str) -> Result<Vec<(String, String)>, FieldError> {
    let pieces = list(value);
    if pieces.len() % 2 != 0 {
        return Err(FieldError::WrongArity {
            expected: "an even number of",
            found: pieces.len(),
        });
    }
    Ok(pieces
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}
