//! Passes that run once every species sits in an evolution tree.

use std::collections::{HashMap, HashSet};

use dex_data::{Ability, Item, LevelMove, Move, Pokemon, RecordKind, RecordMap, Type, TypeChart};
use log::{debug, info};

use crate::CompileError;
use crate::evolution::{EvolutionForest, NodeId};
use crate::version::FormatVersion;

/// The species' own node in its shared tree.
fn own_node(forest: &EvolutionForest, mon: &Pokemon) -> Option<NodeId> {
    mon.tree.and_then(|tree| forest.find(tree, &mon.key))
}

/// Inherit tribes and line moves down each evolutionary line.
///
/// Species are visited root to leaf so a parent already carries merged values
/// when its children read them. From [`crate::version::LINE_MOVE_MERGE_CUTOFF`]
/// onward line and level-up moves are merged from the immediate parent;
/// earlier formats take line moves from the nearest ancestor that has any.
pub fn inherit_along_lines(version: &FormatVersion, forest: &EvolutionForest, pokemon: &mut RecordMap<Pokemon>) {
    let merge = version.merges_line_moves();
    for tree in forest.trees() {
        for node in forest.breadth_first(tree) {
            let key = forest.node(node).term.pokemon.clone();

            let tribes = forest
                .ancestors(node)
                .map(|id| &pokemon[&forest.node(id).term.pokemon].tribes)
                .find(|tribes| !tribes.is_empty())
                .cloned()
                .unwrap_or_default();

            let parent = forest.node(node).parent.map(|id| &pokemon[&forest.node(id).term.pokemon]);
            let moves = if merge {
                parent.map(|parent| {
                    let own = &pokemon[&key];
                    let line: Vec<String> = parent.line_moves.iter().chain(&own.line_moves).cloned().collect();
                    (line, merge_level_moves(&parent.level_moves, &own.level_moves))
                })
            } else {
                forest
                    .ancestors(node)
                    .map(|id| &pokemon[&forest.node(id).term.pokemon].line_moves)
                    .find(|line| !line.is_empty())
                    .map(|line| (line.clone(), pokemon[&key].level_moves.clone()))
            };

            let mon = &mut pokemon[&key];
            mon.tribes = tribes;
            if let Some((line, level)) = moves {
                mon.line_moves = line;
                mon.level_moves = level;
            }
        }
    }
    debug!("inherited tribes and moves across {} trees", forest.tree_count());
}

/// Parent's level moves followed by the child's, without repeated
/// `(level, move)` pairs, stable-sorted by level.
pub fn merge_level_moves(parent: &[LevelMove], own: &[LevelMove]) -> Vec<LevelMove> {
    let mut seen = HashSet::new();
    let mut merged: Vec<LevelMove> = parent
        .iter()
        .chain(own)
        .filter(|m| seen.insert((m.level, m.move_key.as_str())))
        .cloned()
        .collect();
    merged.sort_by_key(|m| m.level);
    merged
}

/// Flag abilities, moves and wild-held items used by at most one final form.
pub fn flag_signatures(
    forest: &EvolutionForest,
    pokemon: &RecordMap<Pokemon>,
    abilities: &mut RecordMap<Ability>,
    moves: &mut RecordMap<Move>,
    items: &mut RecordMap<Item>,
) {
    let mut ability_uses: HashMap<&str, usize> = HashMap::new();
    let mut move_uses: HashMap<&str, usize> = HashMap::new();
    let mut item_uses: HashMap<&str, usize> = HashMap::new();

    let finals = pokemon
        .values()
        .filter(|mon| own_node(forest, mon).is_some_and(|node| forest.is_leaf(node)));
    let mut final_count = 0;
    for mon in finals {
        final_count += 1;
        let unique: HashSet<&str> = mon.abilities.iter().map(String::as_str).collect();
        for ability in unique {
            *ability_uses.entry(ability).or_default() += 1;
        }
        for m in mon.move_pool() {
            *move_uses.entry(m).or_default() += 1;
        }
        let unique: HashSet<&str> = mon.wild_items.iter().map(|w| w.item.as_str()).collect();
        for item in unique {
            *item_uses.entry(item).or_default() += 1;
        }
    }

    let uses = |tally: &HashMap<&str, usize>, key: &str| tally.get(key).copied().unwrap_or(0);
    for ability in abilities.values_mut() {
        ability.is_signature = uses(&ability_uses, &ability.key) <= 1;
    }
    for m in moves.values_mut() {
        m.is_signature = uses(&move_uses, &m.key) <= 1;
    }
    for item in items.values_mut() {
        item.is_signature = uses(&item_uses, &item.key) <= 1;
    }
    info!(
        "tallied signatures over {final_count} final forms: {} abilities, {} moves flagged",
        abilities.values().filter(|a| a.is_signature).count(),
        moves.values().filter(|m| m.is_signature).count()
    );
}

/// Square attacker × defender multiplier matrix indexed by declared type index.
///
/// # Errors
/// - `MalformedField` when a type's index falls outside the chart
pub fn build_type_chart(types: &RecordMap<Type>) -> Result<TypeChart, CompileError> {
    let size = types.len();
    let mut chart = vec![vec![1.0_f32; size]; size];
    if let Some(bad) = types.values().find(|t| t.index >= size) {
        return Err(CompileError::MalformedField {
            kind: RecordKind::Type,
            key: bad.key.clone(),
            field: "index".to_string(),
            value: bad.index.to_string(),
            reason: format!("outside a chart of {size} types"),
        });
    }
    for attacker in types.values() {
        for defender in types.values() {
            let named = |list: &[String]| list.iter().any(|k| *k == attacker.key);
            let multiplier = if named(&defender.weaknesses) {
                2.0
            } else if named(&defender.resistances) {
                0.5
            } else if named(&defender.immunities) {
                0.0
            } else {
                1.0
            };
            chart[attacker.index][defender.index] = multiplier;
        }
    }
    Ok(chart)
}

#[cfg(test)]
mod tests {
    use dex_data::WildItem;

    use super::*;
    use crate::evolution::build_trees;
    use crate::evolution::tests::species;

    fn lm(level: u32, key: &str) -> LevelMove {
        LevelMove {
            level,
            move_key: key.to_string(),
        }
    }

    fn bulbasaur_line() -> RecordMap<Pokemon> {
        let mut mons = RecordMap::from_iter([
            species("VENUSAUR", &[]),
            species("IVYSAUR", &[("VENUSAUR", "Level", "32")]),
            species("BULBASAUR", &[("IVYSAUR", "Level", "16")]),
        ]);
        let bulba = &mut mons["BULBASAUR"];
        bulba.tribes = vec!["FLORAL".into()];
        bulba.line_moves = vec!["PETALDANCE".into()];
        bulba.level_moves = vec![lm(1, "TACKLE"), lm(7, "VINEWHIP")];
        let ivy = &mut mons["IVYSAUR"];
        ivy.level_moves = vec![lm(1, "TACKLE"), lm(4, "GROWL"), lm(20, "RAZORLEAF")];
        ivy.line_moves = vec!["GIGADRAIN".into()];
        mons["VENUSAUR"].level_moves = vec![lm(32, "PETALBLIZZARD")];
        mons
    }

    #[test]
    fn merged_level_moves_are_sorted_and_unique() {
        let mut mons = bulbasaur_line();
        let forest = build_trees(&mut mons).unwrap();
        inherit_along_lines(&FormatVersion::new(3, 0, 0), &forest, &mut mons);

        let venusaur = &mons["VENUSAUR"];
        assert_eq!(
            venusaur.level_moves,
            vec![
                lm(1, "TACKLE"),
                lm(4, "GROWL"),
                lm(7, "VINEWHIP"),
                lm(20, "RAZORLEAF"),
                lm(32, "PETALBLIZZARD"),
            ]
        );
        assert_eq!(venusaur.line_moves, vec!["PETALDANCE", "GIGADRAIN"]);
        assert_eq!(venusaur.tribes, vec!["FLORAL"]);
        assert_eq!(mons["BULBASAUR"].level_moves.len(), 2);
    }

    #[test]
    fn older_formats_take_nearest_line_moves() {
        let mut mons = bulbasaur_line();
        let forest = build_trees(&mut mons).unwrap();
        inherit_along_lines(&FormatVersion::new(2, 5, 0), &forest, &mut mons);

        assert_eq!(mons["IVYSAUR"].line_moves, vec!["GIGADRAIN"]);
        assert_eq!(mons["VENUSAUR"].line_moves, vec!["GIGADRAIN"]);
        assert_eq!(mons["VENUSAUR"].level_moves, vec![lm(32, "PETALBLIZZARD")]);
    }

    #[test]
    fn signature_counts_final_forms_only() {
        let mut mons = RecordMap::from_iter([
            species("PICHU", &[("PIKACHU", "Happiness", "")]),
            species("PIKACHU", &[]),
            species("RAICHU", &[]),
            species("PLUSLE", &[]),
        ]);
        mons["PICHU"].abilities = vec!["A".into()];
        mons["PICHU"].wild_items = vec![WildItem {
            item: "ORANBERRY".into(),
            weight: 50,
        }];
        mons["PIKACHU"].abilities = vec!["A".into(), "B".into()];
        mons["RAICHU"].abilities = vec!["B".into()];
        mons["PLUSLE"].abilities = vec!["B".into(), "B".into()];
        let forest = build_trees(&mut mons).unwrap();

        let mut abilities: RecordMap<Ability> = ["A", "B", "C"]
            .into_iter()
            .map(|k| {
                (
                    k.to_string(),
                    Ability {
                        key: k.to_string(),
                        ..Ability::default()
                    },
                )
            })
            .collect();
        let mut items = RecordMap::from_iter([(
            "ORANBERRY".to_string(),
            Item {
                key: "ORANBERRY".into(),
                ..Item::default()
            },
        )]);
        flag_signatures(&forest, &mons, &mut abilities, &mut RecordMap::new(), &mut items);

        assert!(abilities["A"].is_signature);
        assert!(!abilities["B"].is_signature);
        assert!(abilities["C"].is_signature);
        assert!(items["ORANBERRY"].is_signature);
    }

    fn ty(index: usize, key: &str, weak: &[&str], resist: &[&str], immune: &[&str]) -> (String, Type) {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        (
            key.to_string(),
            Type {
                index,
                key: key.to_string(),
                weaknesses: owned(weak),
                resistances: owned(resist),
                immunities: owned(immune),
                ..Type::default()
            },
        )
    }

    #[test]
    fn type_chart_uses_declared_indices() {
        let types = RecordMap::from_iter([
            ty(1, "GHOST", &["GHOST"], &[], &["NORMAL"]),
            ty(0, "NORMAL", &[], &[], &["GHOST"]),
            ty(2, "STEEL", &[], &["NORMAL", "STEEL"], &[]),
        ]);
        let chart = build_type_chart(&types).unwrap();
        assert_eq!(chart.len(), 3);
        assert!(chart.iter().all(|row| row.len() == 3));
        assert_eq!(chart[0][1], 0.0);
        assert_eq!(chart[1][0], 0.0);
        assert_eq!(chart[1][1], 2.0);
        assert_eq!(chart[0][2], 0.5);
        assert_eq!(chart[2][2], 0.5);
        assert_eq!(chart[0][0], 1.0);
    }

    #[test]
    fn first_matching_list_decides_the_multiplier() {
        let types = RecordMap::from_iter([
            ty(0, "DRAGON", &[], &[], &[]),
            ty(1, "FAIRY", &["DRAGON"], &["DRAGON"], &["DRAGON"]),
            ty(2, "STEEL", &[], &["DRAGON"], &["DRAGON"]),
        ]);
        let chart = build_type_chart(&types).unwrap();
        assert_eq!(chart[0][1], 2.0);
        assert_eq!(chart[0][2], 0.5);
    }

    #[test]
    fn type_chart_rejects_out_of_range_index() {
        let types = RecordMap::from_iter([ty(5, "FIRE", &[], &[], &[])]);
        assert!(matches!(
            build_type_chart(&types),
            Err(CompileError::MalformedField { ref key, .. }) if key == "FIRE"
        ));
    }
}
