//! Stable integer positions for record keys, used by compact encoders downstream.
//!
//! Each compiled version gets its own [`IndexTable`]; tables for several
//! versions live side by side in one [`IndexStore`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::records::{DexSnapshot, Key, RecordMap};

/// Key → position tables for one compiled version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexTable {
    pub types: IndexMap<Key, usize>,
    pub tribes: IndexMap<Key, usize>,
    pub abilities: IndexMap<Key, usize>,
    pub moves: IndexMap<Key, usize>,
    pub items: IndexMap<Key, usize>,
    pub pokemon: IndexMap<Key, usize>,
    pub trainer_types: IndexMap<Key, usize>,
    pub trainers: IndexMap<Key, usize>,
    pub encounters: IndexMap<Key, usize>,
    /// Per species, the ascending move indices of its full move pool.
    pub species_moves: IndexMap<Key, Vec<usize>>,
}

impl IndexTable {
    /// Build the tables from a finished snapshot.
    ///
    /// Moves named in a pool but missing from the move mapping are skipped; the
    /// snapshot validator reports those separately.
    pub fn from_snapshot(snapshot: &DexSnapshot) -> Self {
        let moves = positions(&snapshot.moves);
        let species_moves = snapshot
            .pokemon
            .values()
            .map(|mon| {
                let mut indices: Vec<usize> = mon
                    .move_pool()
                    .into_iter()
                    .filter_map(|m| moves.get(m).copied())
                    .collect();
                indices.sort_unstable();
                indices.dedup();
                (mon.key.clone(), indices)
            })
            .collect();

        Self {
            types: positions(&snapshot.types),
            tribes: positions(&snapshot.tribes),
            abilities: positions(&snapshot.abilities),
            moves,
            items: positions(&snapshot.items),
            pokemon: positions(&snapshot.pokemon),
            trainer_types: positions(&snapshot.trainer_types),
            trainers: positions(&snapshot.trainers),
            encounters: positions(&snapshot.encounters),
            species_moves,
        }
    }
}

fn positions<R>(map: &RecordMap<R>) -> IndexMap<Key, usize> {
    map.keys().enumerate().map(|(i, k)| (k.clone(), i)).collect()
}

/// Index tables for every compiled version, keyed by version string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStore {
    #[serde(default)]
    pub versions: BTreeMap<String, IndexTable>,
}

impl IndexStore {
    /// Insert or replace the table for `version`, returning the previous one.
    pub fn insert(&mut self, version: &str, table: IndexTable) -> Option<IndexTable> {
        self.versions.insert(version.to_string(), table)
    }

    pub fn get(&self, version: &str) -> Option<&IndexTable> {
        self.versions.get(version)
    }
}
