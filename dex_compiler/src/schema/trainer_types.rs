use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{RecordKind, TrainerType};

use super::helpers::{list, number};
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

static RULES: LazyLock<RuleTable<TrainerType>> = LazyLock::new(|| {
    let mut rules: RuleTable<TrainerType> = HashMap::new();
    rules.insert("Name", |_, t, v| {
        t.name = v.to_string();
        Ok(())
    });
    rules.insert("Gender", |_, t, v| {
        t.gender = v.to_string();
        Ok(())
    });
    rules.insert("BaseMoney", |_, t, v| {
        t.base_money = number(v)?;
        Ok(())
    });
    rules.insert("SkillLevel", |_, t, v| {
        t.skill_level = Some(number(v)?);
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
    rules.insert("IntroBGM", |_, t, v| {
        t.intro_bgm = v.to_string();
        Ok(())
    });
    rules.insert("BattleBGM", |_, t, v| {
        t.battle_bgm = v.to_string();
        Ok(())
    });
    rules.insert("VictoryBGM", |_, t, v| {
        t.victory_bgm = v.to_string();
        Ok(())
    });
    rules
});

impl RecordSchema for TrainerType {
    const KIND: RecordKind = RecordKind::TrainerType;

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
