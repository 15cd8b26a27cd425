//! Data format version threaded through every parse and propagation call.

use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::CompileError;

/// First release whose bracket lines hold record keys instead of numeric positions.
pub const NAMED_BRACKET_CUTOFF: Version = Version::new(2, 0, 0);

/// First release that merges line and level-up moves down the evolution line.
pub const LINE_MOVE_MERGE_CUTOFF: Version = Version::new(3, 0, 0);

/// Release tag of the data being compiled, compared numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion(Version);

impl FormatVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Bracket lines carry the record key (otherwise a numeric index).
    pub fn uses_named_brackets(&self) -> bool {
        self.0 >= NAMED_BRACKET_CUTOFF
    }

    /// Line and level-up moves are merged from the immediate parent.
    pub fn merges_line_moves(&self) -> bool {
        self.0 >= LINE_MOVE_MERGE_CUTOFF
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FormatVersion {
    type Err = CompileError;

    /// Accepts `3`, `3.1`, `3.1.4`, `v3.1.4` and `3.1.4-beta`; missing parts are zero.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().trim_matches('"').trim_start_matches(['v', 'V']);
        let core = trimmed.split(['-', '+', ' ']).next().unwrap_or_default();
        let mut parts = [0u64; 3];
        let mut count = 0;
        for (slot, piece) in parts.iter_mut().zip(core.split('.')) {
            *slot = piece
                .parse()
                .map_err(|_| CompileError::Settings(format!("unparsable version '{raw}'")))?;
            count += 1;
        }
        if count == 0 || core.split('.').count() > 3 {
            return Err(CompileError::Settings(format!("unparsable version '{raw}'")));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}
