//! Shared data model for compiled dex snapshots.

pub mod index;
pub mod records;
pub mod validate;

pub use index::{IndexStore, IndexTable};
pub use records::*;
pub use validate::{ValidationError, validate_snapshot};
