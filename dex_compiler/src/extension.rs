//! Trainer extension: an extending trainer overlays its roster onto a base trainer.

use std::collections::HashSet;

use dex_data::{RecordKind, RecordMap, Trainer, TrainerPokemon};
use log::{debug, info};

use crate::CompileError;

/// Resolve every trainer that extends another, bases first.
///
/// # Errors
/// - `MissingReference` when a base trainer is not loaded
/// - `ExtensionCycle` when a chain of extensions loops back on itself
pub fn resolve_extensions(trainers: &mut RecordMap<Trainer>) -> Result<(), CompileError> {
    let mut resolved: HashSet<String> = trainers
        .values()
        .filter(|t| t.extends.is_none())
        .map(|t| t.key.clone())
        .collect();
    let pending: Vec<String> = trainers
        .values()
        .filter(|t| t.extends.is_some())
        .map(|t| t.key.clone())
        .collect();
    for key in &pending {
        resolve(key, trainers, &mut resolved, &mut Vec::new())?;
    }
    info!("resolved {} trainer extensions", pending.len());
    Ok(())
}

fn resolve(
    key: &str,
    trainers: &mut RecordMap<Trainer>,
    resolved: &mut HashSet<String>,
    chain: &mut Vec<String>,
) -> Result<(), CompileError> {
    if resolved.contains(key) {
        return Ok(());
    }
    if chain.iter().any(|k| k == key) {
        return Err(CompileError::ExtensionCycle { key: key.to_string() });
    }
    let Some(base_key) = trainers[key].extends.as_ref().map(dex_data::TrainerRef::key) else {
        resolved.insert(key.to_string());
        return Ok(());
    };
    if !trainers.contains_key(&base_key) {
        return Err(CompileError::MissingReference {
            kind: RecordKind::Trainer,
            key: base_key,
            context: format!("extension of trainer '{key}'"),
        });
    }

    chain.push(key.to_string());
    resolve(&base_key, trainers, resolved, chain)?;
    chain.pop();

    let base = trainers[&base_key].clone();
    apply_extension(&base, &mut trainers[key]);
    debug!("trainer '{key}' extended '{base_key}'");
    resolved.insert(key.to_string());
    Ok(())
}

/// Overlay `trainer` onto `base` in place.
pub fn apply_extension(base: &Trainer, trainer: &mut Trainer) {
    trainer.pokemon = merge_roster(&base.pokemon, &trainer.pokemon);
    trainer.flags = base.flags.iter().chain(&trainer.flags).cloned().collect();
    trainer.policies = base.policies.iter().chain(&trainer.policies).cloned().collect();
    if trainer.lose_text.is_empty() {
        trainer.lose_text.clone_from(&base.lose_text);
    }
    if trainer.items.is_empty() {
        trainer.items.clone_from(&base.items);
    }
}

/// Copy of `base` with each override matched to the first unmatched slot of
/// the same species; unmatched overrides are appended.
pub fn merge_roster(base: &[TrainerPokemon], overrides: &[TrainerPokemon]) -> Vec<TrainerPokemon> {
    let mut merged = base.to_vec();
    let mut matched = vec![false; base.len()];
    for over in overrides {
        let slot = (0..base.len()).find(|&i| !matched[i] && base[i].id == over.id);
        match slot {
            Some(i) => {
                matched[i] = true;
                overlay(&mut merged[i], over);
            },
            None => merged.push(over.clone()),
        }
    }
    merged
}

fn overlay(slot: &mut TrainerPokemon, over: &TrainerPokemon) {
    slot.level = over.level;
    if over.name.is_some() {
        slot.name.clone_from(&over.name);
    }
    if over.gender.is_some() {
        slot.gender.clone_from(&over.gender);
    }
    if over.ability_index.is_some() {
        slot.ability_index = over.ability_index;
    }
    if over.item_type.as_deref().is_some_and(|t| !t.is_empty()) {
        slot.item_type.clone_from(&over.item_type);
    }
    if !over.items.is_empty() {
        slot.items.clone_from(&over.items);
    }
    if !over.moves.is_empty() {
        slot.moves.clone_from(&over.moves);
    }
    if over.style_points.is_some() {
        slot.style_points.clone_from(&over.style_points);
    }
}

#[cfg(test)]
mod tests {
    use dex_data::TrainerRef;

    use super::*;

    fn mon(id: &str, level: u32, moves: &[&str]) -> TrainerPokemon {
        TrainerPokemon {
            id: id.to_string(),
            level,
            moves: moves.iter().map(|m| (*m).to_string()).collect(),
            ..TrainerPokemon::default()
        }
    }

    fn trainer(class: &str, name: &str, version: Option<u32>, extends: Option<Option<u32>>) -> (String, Trainer) {
        let key = dex_data::trainer_key(class, name, version);
        (
            key.clone(),
            Trainer {
                key,
                class: class.to_string(),
                name: name.to_string(),
                version,
                extends: extends.map(|v| TrainerRef {
                    class: class.to_string(),
                    name: name.to_string(),
                    version: v,
                }),
                ..Trainer::default()
            },
        )
    }

    #[test]
    fn empty_override_fields_keep_base_values() {
        let merged = merge_roster(&[mon("PIKACHU", 10, &["THUNDERSHOCK"])], &[mon("PIKACHU", 15, &[])]);
        assert_eq!(merged, vec![mon("PIKACHU", 15, &["THUNDERSHOCK"])]);
    }

    #[test]
    fn set_override_fields_replace_base_values() {
        let base = TrainerPokemon {
            ability_index: Some(0),
            items: vec!["LIGHTBALL".into()],
            item_type: Some("Held".into()),
            ..mon("PIKACHU", 10, &["THUNDERSHOCK"])
        };
        let over = TrainerPokemon {
            ability_index: Some(1),
            items: vec!["ORANBERRY".into(), "SITRUSBERRY".into()],
            item_type: Some("Bag".into()),
            ..mon("PIKACHU", 20, &["THUNDERBOLT"])
        };
        let merged = merge_roster(&[base], &[over.clone()]);
        assert_eq!(merged, vec![over]);
    }

    #[test]
    fn unset_override_fields_leave_base_alone() {
        let base = TrainerPokemon {
            name: Some("Sparky".into()),
            ability_index: Some(1),
            items: vec!["LIGHTBALL".into()],
            item_type: Some("Held".into()),
            ..mon("PIKACHU", 10, &["THUNDERSHOCK"])
        };
        let over = TrainerPokemon {
            item_type: Some(String::new()),
            ..mon("PIKACHU", 25, &[])
        };
        let merged = merge_roster(&[base.clone()], &[over]);
        assert_eq!(merged, vec![TrainerPokemon { level: 25, ..base }]);
    }

    #[test]
    fn duplicate_species_match_in_order_and_extras_append() {
        let base = [mon("RATTATA", 5, &["TACKLE"]), mon("RATTATA", 6, &["BITE"])];
        let over = [
            mon("RATTATA", 7, &[]),
            mon("RATTATA", 8, &["HYPERFANG"]),
            mon("RATTATA", 9, &[]),
        ];
        let merged = merge_roster(&base, &over);
        assert_eq!(
            merged,
            vec![
                mon("RATTATA", 7, &["TACKLE"]),
                mon("RATTATA", 8, &["HYPERFANG"]),
                mon("RATTATA", 9, &[]),
            ]
        );
    }

    #[test]
    fn chains_resolve_base_first() {
        let mut trainers = RecordMap::from_iter([
            trainer("LEADER", "Misty", Some(2), Some(Some(1))),
            trainer("LEADER", "Misty", Some(1), Some(None)),
            trainer("LEADER", "Misty", None, None),
        ]);
        {
            let root = &mut trainers["LEADER,Misty"];
            root.flags = vec!["Leader".into()];
            root.lose_text = "Wow!".into();
            root.pokemon = vec![mon("STARYU", 18, &["WATERGUN"])];
        }
        trainers["LEADER,Misty,1"].pokemon = vec![mon("STARMIE", 21, &["BUBBLEBEAM"])];
        trainers["LEADER,Misty,2"].flags = vec!["Rematch".into()];

        resolve_extensions(&mut trainers).unwrap();
        let top = &trainers["LEADER,Misty,2"];
        assert_eq!(top.lose_text, "Wow!");
        assert_eq!(top.flags, vec!["Leader", "Rematch"]);
        assert_eq!(top.pokemon.len(), 2);
        assert_eq!(top.pokemon[1].id, "STARMIE");
    }

    #[test]
    fn missing_base_is_fatal() {
        let mut trainers = RecordMap::from_iter([trainer("YOUNGSTER", "Joey", Some(1), Some(None))]);
        let err = resolve_extensions(&mut trainers).unwrap_err();
        assert!(matches!(err, CompileError::MissingReference { ref key, .. } if key == "YOUNGSTER,Joey"));
    }

    #[test]
    fn cycles_are_reported() {
        let mut trainers = RecordMap::from_iter([
            trainer("ACE", "Kim", Some(1), Some(Some(2))),
            trainer("ACE", "Kim", Some(2), Some(Some(1))),
        ]);
        assert!(matches!(
            resolve_extensions(&mut trainers),
            Err(CompileError::ExtensionCycle { .. })
        ));
    }
}
