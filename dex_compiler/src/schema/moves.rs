use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{Move, RecordKind};

use super::helpers::{list, number};
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

static RULES: LazyLock<RuleTable<Move>> = LazyLock::new(|| {
    let mut rules: RuleTable<Move> = HashMap::new();
    rules.insert("Name", |_, m, v| {
        m.name = v.to_string();
        Ok(())
    });
    rules.insert("Type", |_, m, v| {
        m.move_type = v.to_string();
        Ok(())
    });
    rules.insert("Category", |_, m, v| {
        m.category = v.to_string();
        Ok(())
    });
    rules.insert("Power", |_, m, v| {
        m.power = number(v)?;
        Ok(())
    });
    rules.insert("Accuracy", |_, m, v| {
        m.accuracy = number(v)?;
        Ok(())
    });
    rules.insert("TotalPP", |_, m, v| {
        m.total_pp = number(v)?;
        Ok(())
    });
    rules.insert("EffectChance", |_, m, v| {
        m.effect_chance = number(v)?;
        Ok(())
    });
    rules.insert("Priority", |_, m, v| {
        m.priority = number(v)?;
        Ok(())
    });
    rules.insert("Target", |_, m, v| {
        m.target = v.to_string();
        Ok(())
    });
    rules.insert("FunctionCode", |_, m, v| {
        m.function_code = v.to_string();
        Ok(())
    });
    rules.insert("Flags", |_, m, v| {
        m.flags = list(v);
        Ok(())
    });
    rules.insert("Description", |_, m, v| {
        m.description = v.to_string();
        Ok(())
    });
    rules
});

impl RecordSchema for Move {
    const KIND: RecordKind = RecordKind::Move;

    fn rules() -> &'static RuleTable<Self> {
        &RULES
    }

    fn bracket(_version: &FormatVersion, record: &mut Self, interior: &str) -> Result<(), FieldError> {
        record.key = interior.to_string();
        Ok(())
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompileError;
    use crate::dispatch::build_record;
    use crate::tokenizer::Line;

    #[test]
    fn numeric_fields_round_trip() {
        let lines = [
            Line::Bracket("MEGAHORN"),
            Line::Field {
                name: "Power",
                value: "90",
            },
            Line::Field {
                name: "Priority",
                value: "-1",
            },
            Line::Field {
                name: "Flags",
                value: "Contact,CanProtect",
            },
        ];
        let m: Move = build_record(&FormatVersion::new(3, 0, 0), &lines, 5).unwrap();
        assert_eq!(m.power, 90);
        assert_eq!(m.priority, -1);
        assert_eq!(m.flags, vec!["Contact", "CanProtect"]);
    }

    #[test]
    fn non_numeric_power_names_record_and_field() {
        let lines = [
            Line::Bracket("MEGAHORN"),
            Line::Field {
                name: "Power",
                value: "lots",
            },
        ];
        let err = build_record::<Move>(&FormatVersion::new(3, 0, 0), &lines, 5).unwrap_err();
        match err {
            CompileError::MalformedField { kind, key, field, value, .. } => {
                assert_eq!(kind, RecordKind::Move);
                assert_eq!(key, "MEGAHORN");
                assert_eq!(field, "Power");
                assert_eq!(value, "lots");
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn record_without_bracket_has_no_key() {
        let lines = [Line::Field {
            name: "Name",
            value: "Orphan",
        }];
        let err = build_record::<Move>(&FormatVersion::new(3, 0, 0), &lines, 7).unwrap_err();
        assert!(matches!(err, CompileError::MissingKey { line: 7, .. }));
    }
}
