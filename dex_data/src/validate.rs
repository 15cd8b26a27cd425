use std::fmt;

use crate::*;

/// Validation finding for a dangling reference or broken invariant in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingReference {
        kind: RecordKind,
        key: String,
        context: String,
    },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingReference { kind, key, context } => {
                write!(f, "missing {kind} '{key}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check cross-references and structural invariants of a compiled snapshot.
///
/// ```
/// use dex_data::{DexSnapshot, Pokemon, validate_snapshot};
///
/// let mut snapshot = DexSnapshot::default();
/// snapshot.pokemon.insert(
///     "EEVEE".into(),
///     Pokemon { key: "EEVEE".into(), types: vec!["NORMAL".into()], ..Pokemon::default() },
/// );
/// let errors = validate_snapshot(&snapshot);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].to_string(), "missing type 'NORMAL' (pokemon 'EEVEE')");
/// ```
pub fn validate_snapshot(snapshot: &DexSnapshot) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_keys(RecordKind::Type, snapshot.types.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(RecordKind::Tribe, snapshot.tribes.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(RecordKind::Ability, snapshot.abilities.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(RecordKind::Move, snapshot.moves.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(RecordKind::Item, snapshot.items.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(RecordKind::Pokemon, snapshot.pokemon.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(
        RecordKind::TrainerType,
        snapshot.trainer_types.iter().map(|(k, r)| (k, &r.key)),
        &mut errors,
    );
    check_keys(RecordKind::Trainer, snapshot.trainers.iter().map(|(k, r)| (k, &r.key)), &mut errors);
    check_keys(
        RecordKind::EncounterMap,
        snapshot.encounters.iter().map(|(k, r)| (k, &r.key)),
        &mut errors,
    );

    let side = snapshot.types.len();
    if snapshot.type_chart.len() != side || snapshot.type_chart.iter().any(|row| row.len() != side) {
        errors.push(ValidationError::InvalidValue {
            context: format!("type chart is not {side}x{side}"),
        });
    }

    for mon in snapshot
        .pokemon
        .values()
        .chain(snapshot.forms.values().flat_map(|forms| forms.iter()))
    {
        let context = match mon.form_id {
            Some(form) => format!("pokemon '{}' form {form}", mon.key),
            None => format!("pokemon '{}'", mon.key),
        };
        validate_pokemon(snapshot, mon, &context, &mut errors);
    }

    for trainer in snapshot.trainers.values() {
        if !snapshot.trainer_types.contains_key(&trainer.class) {
            errors.push(missing(RecordKind::TrainerType, &trainer.class, format!("trainer '{}'", trainer.key)));
        }
        for slot in &trainer.pokemon {
            let context = format!("trainer '{}' slot '{}'", trainer.key, slot.id);
            check_ref(RecordKind::Pokemon, &slot.id, &snapshot.pokemon, &context, &mut errors);
            for m in &slot.moves {
                check_ref(RecordKind::Move, m, &snapshot.moves, &context, &mut errors);
            }
            for item in &slot.items {
                check_ref(RecordKind::Item, item, &snapshot.items, &context, &mut errors);
            }
        }
    }

    for map in snapshot.encounters.values() {
        for table in &map.tables {
            for enc in &table.encounters {
                let context = format!("encounter map '{}' table '{}'", map.key, table.kind);
                check_ref(RecordKind::Pokemon, &enc.pokemon, &snapshot.pokemon, &context, &mut errors);
            }
        }
    }

    errors
}

fn validate_pokemon(snapshot: &DexSnapshot, mon: &Pokemon, context: &str, errors: &mut Vec<ValidationError>) {
    for t in &mon.types {
        check_ref(RecordKind::Type, t, &snapshot.types, context, errors);
    }
    for a in &mon.abilities {
        check_ref(RecordKind::Ability, a, &snapshot.abilities, context, errors);
    }
    for m in mon.move_pool() {
        check_ref(RecordKind::Move, m, &snapshot.moves, context, errors);
    }
    for t in &mon.tribes {
        check_ref(RecordKind::Tribe, t, &snapshot.tribes, context, errors);
    }
    for w in &mon.wild_items {
        check_ref(RecordKind::Item, &w.item, &snapshot.items, context, errors);
    }
}

fn check_keys<'a>(
    kind: RecordKind,
    keys: impl Iterator<Item = (&'a String, &'a String)>,
    errors: &mut Vec<ValidationError>,
) {
    for (map_key, record_key) in keys {
        if map_key.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("{kind} with empty key"),
            });
        } else if map_key != record_key {
            errors.push(ValidationError::InvalidValue {
                context: format!("{kind} '{map_key}' stored with record key '{record_key}'"),
            });
        }
    }
}

fn check_ref<R>(kind: RecordKind, key: &str, map: &RecordMap<R>, context: &str, errors: &mut Vec<ValidationError>) {
    if !map.contains_key(key) {
        errors.push(missing(kind, key, context.to_string()));
    }
}

fn missing(kind: RecordKind, key: &str, context: String) -> ValidationError {
    ValidationError::MissingReference {
        kind,
        key: key.to_string(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_snapshot() -> DexSnapshot {
        let mut snapshot = DexSnapshot::default();
        snapshot.types.insert(
            "ELECTRIC".into(),
            Type {
                key: "ELECTRIC".into(),
                name: "Electric".into(),
                is_real_type: true,
                ..Type::default()
            },
        );
        snapshot.type_chart = vec![vec![1.0]];
        snapshot.moves.insert(
            "THUNDERSHOCK".into(),
            Move {
                key: "THUNDERSHOCK".into(),
                ..Move::default()
            },
        );
        snapshot.pokemon.insert(
            "PIKACHU".into(),
            Pokemon {
                key: "PIKACHU".into(),
                types: vec!["ELECTRIC".into()],
                level_moves: vec![LevelMove {
                    level: 1,
                    move_key: "THUNDERSHOCK".into(),
                }],
                ..Pokemon::default()
            },
        );
        snapshot
    }

    #[test]
    fn clean_snapshot_has_no_findings() {
        assert!(validate_snapshot(&base_snapshot()).is_empty());
    }

    #[test]
    fn reports_dangling_roster_and_encounter_species() {
        let mut snapshot = base_snapshot();
        snapshot.trainer_types.insert(
            "YOUNGSTER".into(),
            TrainerType {
                key: "YOUNGSTER".into(),
                ..TrainerType::default()
            },
        );
        snapshot.trainers.insert(
            "YOUNGSTER,Joey".into(),
            Trainer {
                key: "YOUNGSTER,Joey".into(),
                class: "YOUNGSTER".into(),
                name: "Joey".into(),
                pokemon: vec![TrainerPokemon {
                    id: "RATTATA".into(),
                    level: 4,
                    ..TrainerPokemon::default()
                }],
                ..Trainer::default()
            },
        );
        snapshot.encounters.insert(
            "001".into(),
            EncounterMap {
                key: "001".into(),
                id: 1,
                tables: vec![EncounterTable {
                    kind: "Land".into(),
                    rate: Some(21),
                    encounters: vec![Encounter {
                        weight: 100,
                        pokemon: "PIDGEY".into(),
                        form: None,
                        min_level: 2,
                        max_level: 3,
                    }],
                }],
                ..EncounterMap::default()
            },
        );

        let errors = validate_snapshot(&snapshot);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::MissingReference {
            kind: RecordKind::Pokemon,
            key: "RATTATA".into(),
            context: "trainer 'YOUNGSTER,Joey' slot 'RATTATA'".into(),
        }));
        assert!(errors.iter().any(|e| e.to_string().contains("'PIDGEY'")));
    }

    #[test]
    fn reports_non_square_chart() {
        let mut snapshot = base_snapshot();
        snapshot.type_chart = vec![vec![1.0, 1.0]];
        let errors = validate_snapshot(&snapshot);
        assert_eq!(
            errors,
            vec![ValidationError::InvalidValue {
                context: "type chart is not 1x1".into()
            }]
        );
    }
}
