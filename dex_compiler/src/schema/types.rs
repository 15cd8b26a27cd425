use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{RecordKind, Type};

use super::helpers::{boolean, list, number};
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

static RULES: LazyLock<RuleTable<Type>> = LazyLock::new(|| {
    let mut rules: RuleTable<Type> = HashMap::new();
    rules.insert("Name", |_, t, v| {
        t.name = v.to_string();
        Ok(())
    });
    rules.insert("InternalName", |_, t, v| {
        t.key = v.to_string();
        Ok(())
    });
    rules.insert("Weaknesses", |_, t, v| {
        t.weaknesses = list(v);
        Ok(())
    });
    rules.insert("Resistances", |_, t, v| {
        t.resistances = list(v);
        Ok(())
    });
    rules.insert("Immunities", |_, t, v| {
        t.immunities = list(v);
        Ok(())
    });
    rules.insert("IsPseudoType", |_, t, v| {
        t.is_real_type = !boolean(v)?;
        Ok(())
    });
    rules.insert("IsSpecialType", |_, t, v| {
        t.is_special_type = boolean(v)?;
        Ok(())
    });
    rules.insert("IconPosition", |_, t, v| {
        t.icon_position = Some(number(v)?);
        Ok(())
    });
    rules
});

impl RecordSchema for Type {
    const KIND: RecordKind = RecordKind::Type;

    fn rules() -> &'static RuleTable<Self> {
        &RULES
    }

    fn bracket(version: &FormatVersion, record: &mut Self, interior: &str) -> Result<(), FieldError> {
        if version.uses_named_brackets() {
            record.key = interior.to_string();
        } else {
            record.index = number(interior)?;
        }
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

    #[test]
    fn legacy_bracket_is_index_and_key_comes_from_internal_name() {
        let lines = [
            Line::Bracket("9"),
            Line::Field {
                name: "Name",
                value: "???",
            },
            Line::Field {
                name: "InternalName",
                value: "QMARKS",
            },
            Line::Field {
                name: "IsPseudoType",
                value: "true",
            },
        ];
        let t: Type = build_record(&FormatVersion::new(1, 5, 0), &lines, 10).unwrap();
        assert_eq!(t.index, 9);
        assert_eq!(t.key, "QMARKS");
        assert!(!t.is_real_type);
    }

    #[test]
    fn named_bracket_is_key_and_index_is_left_for_numbering() {
        let lines = [
            Line::Bracket("FIRE"),
            Line::Field {
                name: "Weaknesses",
                value: "WATER,GROUND,ROCK",
            },
            Line::Field {
                name: "Unknown",
                value: "ignored",
            },
        ];
        let t: Type = build_record(&FormatVersion::new(3, 0, 0), &lines, 10).unwrap();
        assert_eq!(t.index, 0);
        assert_eq!(t.key, "FIRE");
        assert!(t.is_real_type);
        assert_eq!(t.weaknesses, vec!["WATER", "GROUND", "ROCK"]);
    }
}
