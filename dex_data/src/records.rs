use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Stable identifier used across record references (e.g. `PIKACHU`, `THUNDERBOLT`).
pub type Key = String;

/// Insertion-ordered mapping from record key to record.
pub type RecordMap<R> = IndexMap<Key, R>;

/// Square effectiveness matrix: rows are attacking type indices, columns defending.
pub type TypeChart = Vec<Vec<f32>>;

/// Record kinds that the compiler knows how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Type,
    Tribe,
    Ability,
    Move,
    Item,
    Pokemon,
    Form,
    TrainerType,
    Trainer,
    EncounterMap,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Type => "type",
            RecordKind::Tribe => "tribe",
            RecordKind::Ability => "ability",
            RecordKind::Move => "move",
            RecordKind::Item => "item",
            RecordKind::Pokemon => "pokemon",
            RecordKind::Form => "form",
            RecordKind::TrainerType => "trainer type",
            RecordKind::Trainer => "trainer",
            RecordKind::EncounterMap => "encounter map",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elemental type and its defensive relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    /// Matrix coordinate in the type chart.
    pub index: usize,
    pub key: Key,
    pub name: String,
    #[serde(default)]
    pub weaknesses: Vec<Key>,
    #[serde(default)]
    pub resistances: Vec<Key>,
    #[serde(default)]
    pub immunities: Vec<Key>,
    /// False for pseudo-types such as `???` that never appear on species.
    pub is_real_type: bool,
    #[serde(default)]
    pub is_special_type: bool,
    #[serde(default)]
    pub icon_position: Option<u32>,
}

impl Default for Type {
    fn default() -> Self {
        Self {
            index: 0,
            key: String::new(),
            name: String::new(),
            weaknesses: Vec::new(),
            resistances: Vec::new(),
            immunities: Vec::new(),
            is_real_type: true,
            is_special_type: false,
            icon_position: None,
        }
    }
}

/// A tribe grants a bonus once enough team members share it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tribe {
    pub key: Key,
    pub activation_count: u32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub key: Key,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub flags: Vec<String>,
    /// Used by at most one final-form species.
    pub is_signature: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub key: Key,
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Key,
    pub category: String,
    pub power: u32,
    pub accuracy: u32,
    #[serde(rename = "totalPP")]
    pub total_pp: u32,
    pub effect_chance: u32,
    pub priority: i32,
    pub target: String,
    pub function_code: String,
    #[serde(default)]
    pub flags: Vec<String>,
    pub description: String,
    /// Learnable by at most one final-form species.
    pub is_signature: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub key: Key,
    pub name: String,
    pub name_plural: String,
    pub pocket: u32,
    pub price: u32,
    pub field_use: String,
    pub battle_use: String,
    #[serde(default)]
    pub flags: Vec<String>,
    pub description: String,
    /// Held in the wild by at most one final-form species.
    pub is_signature: bool,
}

/// Six base stats in data-file order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub special_attack: u32,
    pub special_defense: u32,
}

impl BaseStats {
    pub fn total(&self) -> u32 {
        self.hp + self.attack + self.defense + self.speed + self.special_attack + self.special_defense
    }

    pub fn is_unset(&self) -> bool {
        *self == BaseStats::default()
    }
}

/// A move learned at a given level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelMove {
    pub level: u32,
    #[serde(rename = "move")]
    pub move_key: Key,
}

/// An item a wild specimen may hold, with its relative weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildItem {
    pub item: Key,
    pub weight: u32,
}

/// One evolution step: target species, method, and method condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionTerm {
    pub pokemon: Key,
    pub method: String,
    pub condition: String,
}

impl EvolutionTerm {
    /// The term naming a species itself, used for tree roots.
    pub fn root(pokemon: &str) -> Self {
        Self {
            pokemon: pokemon.to_string(),
            method: String::new(),
            condition: String::new(),
        }
    }
}

/// Handle to an evolution tree owned by the compiler's tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(pub usize);

/// Serializable evolution tree: `[term, [children...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionTreeDef(pub EvolutionTerm, pub Vec<EvolutionTreeDef>);

impl EvolutionTreeDef {
    /// Every species key in the tree, root first (pre-order).
    pub fn species(&self) -> Vec<&str> {
        let mut out = vec![self.0.pokemon.as_str()];
        for child in &self.1 {
            out.extend(child.species());
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub key: Key,
    /// National dex number (or load position in newer formats).
    pub id: u32,
    #[serde(default)]
    pub form_id: Option<u32>,
    #[serde(default)]
    pub form_name: String,
    pub name: String,
    pub category: String,
    pub pokedex: String,
    pub types: Vec<Key>,
    pub base_stats: BaseStats,
    pub bst: u32,
    pub abilities: Vec<Key>,
    pub level_moves: Vec<LevelMove>,
    pub line_moves: Vec<Key>,
    pub tutor_moves: Vec<Key>,
    pub form_specific_moves: Vec<Key>,
    pub tribes: Vec<Key>,
    pub wild_items: Vec<WildItem>,
    pub evolutions: Vec<EvolutionTerm>,
    pub height: f32,
    pub weight: f32,
    pub catch_rate: u32,
    pub base_exp: u32,
    pub growth_rate: String,
    pub gender_ratio: String,
    pub egg_groups: Vec<String>,
    pub color: String,
    pub shape: String,
    pub habitat: String,
    pub generation: u32,
    pub flags: Vec<String>,
    #[serde(skip)]
    pub tree: Option<TreeId>,
    #[serde(default)]
    pub evolution_tree: Option<EvolutionTreeDef>,
}

impl Pokemon {
    /// Every move this record can learn, in pool order and without duplicates.
    pub fn move_pool(&self) -> Vec<&str> {
        let mut pool: Vec<&str> = Vec::new();
        let all = self
            .level_moves
            .iter()
            .map(|m| m.move_key.as_str())
            .chain(self.line_moves.iter().map(String::as_str))
            .chain(self.tutor_moves.iter().map(String::as_str))
            .chain(self.form_specific_moves.iter().map(String::as_str));
        for m in all {
            if !pool.contains(&m) {
                pool.push(m);
            }
        }
        pool
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerType {
    pub key: Key,
    pub name: String,
    pub gender: String,
    pub base_money: u32,
    pub skill_level: Option<u32>,
    pub flags: Vec<String>,
    pub policies: Vec<String>,
    pub intro_bgm: String,
    pub battle_bgm: String,
    pub victory_bgm: String,
}

/// One roster slot of a trainer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerPokemon {
    /// Species key; also the slot identifier when overlaying an extended roster.
    pub id: Key,
    pub level: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub ability_index: Option<u32>,
    #[serde(default)]
    pub items: Vec<Key>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub moves: Vec<Key>,
    #[serde(default)]
    pub style_points: Option<Vec<u32>>,
}

/// Reference from an extending trainer to its base record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerRef {
    pub class: String,
    pub name: String,
    pub version: Option<u32>,
}

impl TrainerRef {
    /// Composite key `class,name[,version]`.
    pub fn key(&self) -> Key {
        trainer_key(&self.class, &self.name, self.version)
    }
}

/// Build the composite trainer key; version 0 and absent are the same record.
pub fn trainer_key(class: &str, name: &str, version: Option<u32>) -> Key {
    match version {
        Some(v) if v > 0 => format!("{class},{name},{v}"),
        _ => format!("{class},{name}"),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub key: Key,
    pub class: String,
    pub name: String,
    pub version: Option<u32>,
    pub lose_text: String,
    pub items: Vec<Key>,
    pub flags: Vec<String>,
    pub policies: Vec<String>,
    #[serde(default)]
    pub extends: Option<TrainerRef>,
    pub pokemon: Vec<TrainerPokemon>,
}

/// Single weighted wild encounter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub weight: u32,
    pub pokemon: Key,
    pub form: Option<u32>,
    pub min_level: u32,
    pub max_level: u32,
}

/// Encounters for one method/season (e.g. `Land`, `Cave`, `OldRod`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterTable {
    #[serde(rename = "type")]
    pub kind: String,
    pub rate: Option<u32>,
    pub encounters: Vec<Encounter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterMap {
    pub key: Key,
    pub id: u32,
    pub version: Option<u32>,
    pub name: String,
    pub tables: Vec<EncounterTable>,
}

/// Fully compiled, cross-referenced dataset for one game version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexSnapshot {
    pub version: String,
    #[serde(default)]
    pub dev_build: bool,
    pub types: RecordMap<Type>,
    pub tribes: RecordMap<Tribe>,
    pub abilities: RecordMap<Ability>,
    pub moves: RecordMap<Move>,
    pub items: RecordMap<Item>,
    pub pokemon: RecordMap<Pokemon>,
    /// Alternate forms grouped by base species key, ordered by form id.
    pub forms: RecordMap<Vec<Pokemon>>,
    pub trainer_types: RecordMap<TrainerType>,
    pub trainers: RecordMap<Trainer>,
    pub encounters: RecordMap<EncounterMap>,
    pub type_chart: TypeChart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trainer_key_omits_zero_version() {
        assert_eq!(trainer_key("LEADER_Brock", "Brock", None), "LEADER_Brock,Brock");
        assert_eq!(trainer_key("LEADER_Brock", "Brock", Some(0)), "LEADER_Brock,Brock");
        assert_eq!(trainer_key("LEADER_Brock", "Brock", Some(2)), "LEADER_Brock,Brock,2");
    }

    #[test]
    fn move_pool_dedups_across_pools() {
        let mon = Pokemon {
            level_moves: vec![
                LevelMove {
                    level: 1,
                    move_key: "TACKLE".into(),
                },
                LevelMove {
                    level: 7,
                    move_key: "EMBER".into(),
                },
            ],
            line_moves: vec!["TACKLE".into(), "FLAREBLITZ".into()],
            tutor_moves: vec!["EMBER".into(), "SWIFT".into()],
            ..Pokemon::default()
        };
        assert_eq!(mon.move_pool(), vec!["TACKLE", "EMBER", "FLAREBLITZ", "SWIFT"]);
    }

    #[test]
    fn evolution_tree_lists_species_in_pre_order() {
        let tree = EvolutionTreeDef(
            EvolutionTerm::root("CHARMANDER"),
            vec![EvolutionTreeDef(
                EvolutionTerm {
                    pokemon: "CHARMELEON".into(),
                    method: "Level".into(),
                    condition: "16".into(),
                },
                Vec::new(),
            )],
        );
        assert_eq!(tree.species(), vec!["CHARMANDER", "CHARMELEON"]);
    }
}
