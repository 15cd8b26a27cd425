//! Species and form records.
//!
//! The same schema parses `pokemon.txt` and `pokemon_forms.txt`; form records
//! keep their composite `SPECIES,formId` key until the form pass splits it.

use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{BaseStats, EvolutionTerm, LevelMove, Pokemon, RecordKind, WildItem};

use super::helpers::{list, number, number_list, pairs};
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

const WILD_ITEM_COMMON: u32 = 50;
const WILD_ITEM_UNCOMMON: u32 = 5;
const WILD_ITEM_RARE: u32 = 1;

/// Moves only a particular form can learn, keyed by record key.
static FORM_SPECIFIC_MOVES: &[(&str, &[&str])] = &[
    ("ROTOM,1", &["OVERHEAT"]),
    ("ROTOM,2", &["HYDROPUMP"]),
    ("ROTOM,3", &["BLIZZARD"]),
    ("ROTOM,4", &["AIRSLASH"]),
    ("ROTOM,5", &["LEAFSTORM"]),
    ("KYUREM,1", &["ICEBURN", "FUSIONFLARE"]),
    ("KYUREM,2", &["FREEZESHOCK", "FUSIONBOLT"]),
    ("NECROZMA,1", &["SUNSTEELSTRIKE"]),
    ("NECROZMA,2", &["MOONGEISTBEAM"]),
    ("CALYREX,1", &["GLACIALLANCE"]),
    ("CALYREX,2", &["ASTRALBARRAGE"]),
];

pub fn form_specific_moves(key: &str) -> Vec<String> {
    FORM_SPECIFIC_MOVES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, moves)| moves.iter().map(|m| (*m).to_string()).collect())
        .unwrap_or_default()
}

static RULES: LazyLock<RuleTable<Pokemon>> = LazyLock::new(|| {
    let mut rules: RuleTable<Pokemon> = HashMap::new();
    rules.insert("Name", |_, p, v| {
        p.name = v.to_string();
        Ok(())
    });
    rules.insert("InternalName", |_, p, v| {
        p.key = v.to_string();
        Ok(())
    });
    rules.insert("FormName", |_, p, v| {
        p.form_name = v.to_string();
        Ok(())
    });
    rules.insert("Category", |_, p, v| {
        p.category = v.to_string();
        Ok(())
    });
    rules.insert("Kind", |_, p, v| {
        p.category = v.to_string();
        Ok(())
    });
    rules.insert("Pokedex", |_, p, v| {
        p.pokedex = v.to_string();
        Ok(())
    });
    rules.insert("Types", |_, p, v| {
        p.types = list(v);
        Ok(())
    });
    rules.insert("Type1", |_, p, v| {
        match p.types.first_mut() {
            Some(first) => *first = v.to_string(),
            None => p.types.push(v.to_string()),
        }
        Ok(())
    });
    rules.insert("Type2", |_, p, v| {
        if p.types.len() >= 2 {
            p.types[1] = v.to_string();
        } else if p.types.first().is_none_or(|first| first != v) {
            p.types.push(v.to_string());
        }
        Ok(())
    });
    rules.insert("BaseStats", |_, p, v| {
        p.base_stats = base_stats(v)?;
        Ok(())
    });
    rules.insert("Abilities", |_, p, v| {
        p.abilities = list(v);
        Ok(())
    });
    rules.insert("Moves", |_, p, v| {
        p.level_moves = level_moves(v)?;
        Ok(())
    });
    rules.insert("LineMoves", |_, p, v| {
        p.line_moves = list(v);
        Ok(())
    });
    rules.insert("EggMoves", |_, p, v| {
        p.line_moves = list(v);
        Ok(())
    });
    rules.insert("TutorMoves", |_, p, v| {
        p.tutor_moves = list(v);
        Ok(())
    });
    rules.insert("Tribes", |_, p, v| {
        p.tribes = list(v);
        Ok(())
    });
    rules.insert("WildItemCommon", |_, p, v| {
        push_wild_items(p, v, WILD_ITEM_COMMON);
        Ok(())
    });
    rules.insert("WildItemUncommon", |_, p, v| {
        push_wild_items(p, v, WILD_ITEM_UNCOMMON);
        Ok(())
    });
    rules.insert("WildItemRare", |_, p, v| {
        push_wild_items(p, v, WILD_ITEM_RARE);
        Ok(())
    });
    rules.insert("Evolutions", |_, p, v| {
        p.evolutions = evolutions(v)?;
        Ok(())
    });
    rules.insert("Height", |_, p, v| {
        p.height = number(v)?;
        Ok(())
    });
    rules.insert("Weight", |_, p, v| {
        p.weight = number(v)?;
        Ok(())
    });
    rules.insert("CatchRate", |_, p, v| {
        p.catch_rate = number(v)?;
        Ok(())
    });
    rules.insert("BaseExp", |_, p, v| {
        p.base_exp = number(v)?;
        Ok(())
    });
    rules.insert("GrowthRate", |_, p, v| {
        p.growth_rate = v.to_string();
        Ok(())
    });
    rules.insert("GenderRatio", |_, p, v| {
        p.gender_ratio = v.to_string();
        Ok(())
    });
    rules.insert("EggGroups", |_, p, v| {
        p.egg_groups = list(v);
        Ok(())
    });
    rules.insert("Color", |_, p, v| {
        p.color = v.to_string();
        Ok(())
    });
    rules.insert("Shape", |_, p, v| {
        p.shape = v.to_string();
        Ok(())
    });
    rules.insert("Habitat", |_, p, v| {
        p.habitat = v.to_string();
        Ok(())
    });
    rules.insert("Generation", |_, p, v| {
        p.generation = number(v)?;
        Ok(())
    });
    rules.insert("Flags", |_, p, v| {
        p.flags = list(v);
        Ok(())
    });
    rules
});

fn base_stats(value: &str) -> Result<BaseStats, FieldError> {
    let stats: Vec<u32> = number_list(value)?;
    let [hp, attack, defense, speed, special_attack, special_defense] = stats[..] else {
        return Err(FieldError::WrongArity {
            expected: "6",
            found: stats.len(),
        });
    };
    Ok(BaseStats {
        hp,
        attack,
        defense,
        speed,
        special_attack,
        special_defense,
    })
}

fn level_moves(value: &str) -> Result<Vec<LevelMove>, FieldError> {
    pairs(value)?
        .into_iter()
        .map(|(level, move_key)| {
            Ok(LevelMove {
                level: number(&level)?,
                move_key,
            })
        })
        .collect()
}

fn push_wild_items(p: &mut Pokemon, value: &str, weight: u32) {
    p.wild_items
        .extend(list(value).into_iter().map(|item| WildItem { item, weight }));
}

/// `TARGET,Method,Condition` triples; the condition may be empty.
fn evolutions(value: &str) -> Result<Vec<EvolutionTerm>, FieldError> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    let pieces: Vec<&str> = value.split(',').map(str::trim).collect();
    pieces
        .chunks(3)
        .map(|chunk| match chunk {
            [pokemon, method, rest @ ..] if !pokemon.is_empty() => Ok(EvolutionTerm {
                pokemon: (*pokemon).to_string(),
                method: (*method).to_string(),
                condition: rest.first().map(|c| (*c).to_string()).unwrap_or_default(),
            }),
            _ => Err(FieldError::WrongArity {
                expected: "target,method,condition",
                found: chunk.len(),
            }),
        })
        .collect()
}

impl RecordSchema for Pokemon {
    const KIND: RecordKind = RecordKind::Pokemon;

    fn rules() -> &'static RuleTable<Self> {
        &RULES
    }

    /// Older releases put the dex number in the bracket and name the record
    /// with `InternalName`; composite form keys are always keys.
    fn bracket(version: &FormatVersion, record: &mut Self, interior: &str) -> Result<(), FieldError> {
        if !version.uses_named_brackets()
            && let Ok(id) = interior.parse()
        {
            record.id = id;
            return Ok(());
        }
        record.key = interior.to_string();
        Ok(())
    }

    fn finish(_version: &FormatVersion, record: &mut Self) -> Result<(), FieldError> {
        record.bst = record.base_stats.total();
        record.form_specific_moves = form_specific_moves(&record.key);
        Ok(())
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::build_record;
    use crate::tokenizer::Line;

    fn field<'a>(name: &'a str, value: &'a str) -> Line<'a> {
        Line::Field { name, value }
    }

    #[test]
    fn populates_species_and_totals_stats() {
        let lines = [
            Line::Bracket("BULBASAUR"),
            field("Name", "Bulbasaur"),
            field("Types", "GRASS,POISON"),
            field("BaseStats", "45,49,49,45,65,65"),
            field("Moves", "1,TACKLE,3,GROWL,7,VINEWHIP"),
            field("LineMoves", "PETALDANCE"),
            field("WildItemCommon", "MIRACLESEED"),
            field("WildItemRare", "BIGROOT"),
            field("Evolutions", "IVYSAUR,Level,16"),
        ];
        let p: Pokemon = build_record(&FormatVersion::new(3, 0, 0), &lines, 20).unwrap();
        assert_eq!(p.key, "BULBASAUR");
        assert_eq!(p.id, 0);
        assert_eq!(p.bst, 318);
        assert_eq!(
            p.level_moves[2],
            LevelMove {
                level: 7,
                move_key: "VINEWHIP".into()
            }
        );
        assert_eq!(
            p.wild_items[1],
            WildItem {
                item: "BIGROOT".into(),
                weight: 1
            }
        );
        assert_eq!(
            p.evolutions,
            vec![EvolutionTerm {
                pokemon: "IVYSAUR".into(),
                method: "Level".into(),
                condition: "16".into()
            }]
        );
    }

    #[test]
    fn legacy_format_reads_dex_number_and_split_types() {
        let lines = [
            Line::Bracket("25"),
            field("InternalName", "PIKACHU"),
            field("Type1", "ELECTRIC"),
            field("Type2", "ELECTRIC"),
            field("EggMoves", "VOLTTACKLE"),
        ];
        let p: Pokemon = build_record(&FormatVersion::new(1, 0, 0), &lines, 20).unwrap();
        assert_eq!(p.id, 25);
        assert_eq!(p.key, "PIKACHU");
        assert_eq!(p.types, vec!["ELECTRIC"]);
        assert_eq!(p.line_moves, vec!["VOLTTACKLE"]);
    }

    #[test]
    fn evolution_condition_may_be_empty() {
        let terms = evolutions("ESPEON,HappinessDay,,UMBREON,HappinessNight,").unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[1].pokemon, "UMBREON");
        assert!(terms[1].condition.is_empty());
        assert!(evolutions("ESPEON").is_err());
    }

    #[test]
    fn base_stats_need_six_values() {
        assert!(matches!(
            base_stats("1,2,3"),
            Err(FieldError::WrongArity { found: 3, .. })
        ));
    }

    #[test]
    fn form_keys_pick_up_form_specific_moves() {
        let lines = [Line::Bracket("ROTOM,1"), field("FormName", "Heat Rotom")];
        let p: Pokemon = build_record(&FormatVersion::new(3, 0, 0), &lines, 4).unwrap();
        assert_eq!(p.form_specific_moves, vec!["OVERHEAT"]);
    }
}
