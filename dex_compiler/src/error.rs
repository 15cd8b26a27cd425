//! Error taxonomy for a compilation run.
//!
//! Every variant is fatal: the driver aborts the batch on the first error and
//! writes nothing. Unrecognized field names are not errors and never reach here.

use std::path::PathBuf;

use dex_data::RecordKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// A source file could not be retrieved.
    #[error("failed to fetch '{path}': {message}")]
    Fetch { path: String, message: String },
    /// A line that fits none of the recognized shapes.
    #[error("{kind} data line {line}: {message}: '{text}'")]
    MalformedLine {
        kind: RecordKind,
        line: usize,
        text: String,
        message: &'static str,
    },
    /// A field value that could not be interpreted (e.g. text where a number is expected).
    #[error("{kind} '{key}' field '{field}' has malformed value '{value}': {reason}")]
    MalformedField {
        kind: RecordKind,
        key: String,
        field: String,
        value: String,
        reason: String,
    },
    /// A completed record that never received a key.
    #[error("{kind} record ending at data line {line} has no key")]
    MissingKey { kind: RecordKind, line: usize },
    /// A reference to a record absent from the loaded set.
    #[error("missing {kind} '{key}' referenced by {context}")]
    MissingReference {
        kind: RecordKind,
        key: String,
        context: String,
    },
    /// A trainer extension chain that loops back on itself.
    #[error("trainer extension cycle through '{key}'")]
    ExtensionCycle { key: String },
    /// The settings script did not declare a usable version.
    #[error("settings script: {0}")]
    Settings(String),
    /// A compiled artifact could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A fetch or parse task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Why a single field value was rejected; the dispatcher adds record context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("expected a number")]
    NotANumber,
    #[error("expected {expected} comma-separated values, found {found}")]
    WrongArity {
        expected: &'static str,
        found: usize,
    },
    #[error("{0}")]
    Invalid(String),
}
