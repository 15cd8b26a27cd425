use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{Item, RecordKind};

use super::helpers::{list, number};
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

static RULES: LazyLock<RuleTable<Item>> = LazyLock::new(|| {
    let mut rules: RuleTable<Item> = HashMap::new();
    rules.insert("Name", |_, i, v| {
        i.name = v.to_string();
        Ok(())
    });
    rules.insert("NamePlural", |_, i, v| {
        i.name_plural = v.to_string();
        Ok(())
    });
    rules.insert("Pocket", |_, i, v| {
        i.pocket = number(v)?;
        Ok(())
    });
    rules.insert("Price", |_, i, v| {
        i.price = number(v)?;
        Ok(())
    });
    rules.insert("FieldUse", |_, i, v| {
        i.field_use = v.to_string();
        Ok(())
    });
    rules.insert("BattleUse", |_, i, v| {
        i.battle_use = v.to_string();
        Ok(())
    });
    rules.insert("Flags", |_, i, v| {
        i.flags = list(v);
        Ok(())
    });
    rules.insert("Description", |_, i, v| {
        i.description = v.to_string();
        Ok(())
    });
    rules
});

impl RecordSchema for Item {
    const KIND: RecordKind = RecordKind::Item;

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
