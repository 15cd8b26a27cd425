//! Trainer records and their roster slots.
//!
//! A `Pokemon = SPECIES,level` line opens a slot; slot fields that follow it
//! apply to the most recently opened slot. `Items` before the first slot is
//! the trainer's own bag.

use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{RecordKind, Trainer, TrainerPokemon, TrainerRef, trainer_key};

use super::helpers::{list, number, number_list};
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

fn slot(t: &mut Trainer) -> Result<&mut TrainerPokemon, FieldError> {
    t.pokemon
        .last_mut()
        .ok_or_else(|| FieldError::Invalid("slot field appears before any Pokemon line".to_string()))
}

fn extends(t: &mut Trainer) -> &mut TrainerRef {
    t.extends.get_or_insert_with(TrainerRef::default)
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

static RULES: LazyLock<RuleTable<Trainer>> = LazyLock::new(|| {
    let mut rules: RuleTable<Trainer> = HashMap::new();
    rules.insert("Pokemon", |_, t, v| {
        let pieces = list(v);
        let [id, level] = pieces.as_slice() else {
            return Err(FieldError::WrongArity {
                expected: "species,level",
                found: pieces.len(),
            });
        };
        t.pokemon.push(TrainerPokemon {
            id: id.clone(),
            level: number(level)?,
            ..TrainerPokemon::default()
        });
        Ok(())
    });
    rules.insert("Items", |_, t, v| {
        match t.pokemon.last_mut() {
            Some(mon) => mon.items = list(v),
            None => t.items = list(v),
        }
        Ok(())
    });
    rules.insert("Item", |_, t, v| {
        slot(t)?.items.extend(list(v));
        Ok(())
    });
    rules.insert("Name", |_, t, v| {
        slot(t)?.name = optional(v);
        Ok(())
    });
    rules.insert("Gender", |_, t, v| {
        slot(t)?.gender = optional(v);
        Ok(())
    });
    rules.insert("AbilityIndex", |_, t, v| {
        slot(t)?.ability_index = Some(number(v)?);
        Ok(())
    });
    rules.insert("ItemType", |_, t, v| {
        slot(t)?.item_type = optional(v);
        Ok(())
    });
    rules.insert("Moves", |_, t, v| {
        slot(t)?.moves = list(v);
        Ok(())
    });
    rules.insert("StylePoints", |_, t, v| {
        slot(t)?.style_points = Some(number_list(v)?);
        Ok(())
    });
    rules.insert("LoseText", |_, t, v| {
        t.lose_text = v.to_string();
        Ok(())
    });
    rules.insert("Flags", |_, t, v| {
        t.flags = list(v);
        Ok(())
    });
    rules.insert("Policies", |_, t, v| {
        t.policies = list(v);
        Ok(())
    });
    rules.insert("ExtendsVersion", |_, t, v| {
        extends(t).version = Some(number(v)?);
        Ok(())
    });
    rules.insert("ExtendsClass", |_, t, v| {
        extends(t).class = v.to_string();
        Ok(())
    });
    rules.insert("ExtendsName", |_, t, v| {
        extends(t).name = v.to_string();
        Ok(())
    });
    rules
});

impl RecordSchema for Trainer {
    const KIND: RecordKind = RecordKind::Trainer;

    fn rules() -> &'static RuleTable<Self> {
        &RULES
    }

    /// `[class,name]` or `[class,name,version]`.
    fn bracket(_version: &FormatVersion, record: &mut Self, interior: &str) -> Result<(), FieldError> {
        let pieces = list(interior);
        match pieces.as_slice() {
            [class, name] => {
                record.class = class.clone();
                record.name = name.clone();
            },
            [class, name, version] => {
                record.class = class.clone();
                record.name = name.clone();
                record.version = Some(number(version)?);
            },
            _ => {
                return Err(FieldError::WrongArity {
                    expected: "class,name[,version]",
                    found: pieces.len(),
                });
            },
        }
        Ok(())
    }

    /// Composes the key; an extension reference defaults to this trainer's class and name.
    fn finish(_version: &FormatVersion, record: &mut Self) -> Result<(), FieldError> {
        if !record.class.is_empty() {
            record.key = trainer_key(&record.class, &record.name, record.version);
        }
        if let Some(base) = record.extends.as_mut() {
            if base.class.is_empty() {
                base.class.clone_from(&record.class);
            }
            if base.name.is_empty() {
                base.name.clone_from(&record.name);
            }
        }
        Ok(())
    }

    fn key(&self) -> &str {
        &self.key
    }
}
