//! Field dispatch tables for every record kind.
//!
//! Each submodule implements [`RecordSchema`](crate::dispatch::RecordSchema)
//! for one record shape from `dex_data`.

pub(crate) mod helpers;

pub mod abilities;
pub mod items;
pub mod moves;
pub mod pokemon;
pub mod trainer_types;
pub mod trainers;
pub mod tribes;
pub mod types;

use crate::dispatch::RecordSchema;

/// A record kind stored one-per-line, with fields addressed by position.
pub trait PositionalSchema: RecordSchema {
    /// Number of positional fields; the last one keeps any further commas.
    const POSITIONS: usize;
}
