use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{RecordKind, Tribe};

use super::PositionalSchema;
use super::helpers::{number, unquote};
use crate::dispatch::{RecordSchema, RuleTable};

static RULES: LazyLock<RuleTable<Tribe>> = LazyLock::new(|| {
    let mut rules: RuleTable<Tribe> = HashMap::new();
    rules.insert("0", |_, t, v| {
        t.key = v.to_string();
        Ok(())
    });
    rules.insert("1", |_, t, v| {
        t.activation_count = number(v)?;
        Ok(())
    });
    rules.insert("2", |_, t, v| {
        t.name = v.to_string();
        Ok(())
    });
    rules.insert("3", |_, t, v| {
        t.description = unquote(v);
        Ok(())
    });
    rules
});

impl RecordSchema for Tribe {
    const KIND: RecordKind = RecordKind::Tribe;

    fn rules() -> &'static RuleTable<Self> {
        &RULES
    }

    fn key(&self) -> &str {
        &self.key
    }
}

impl PositionalSchema for Tribe {
    const POSITIONS: usize = 4;
}
