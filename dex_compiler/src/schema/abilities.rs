use std::collections::HashMap;
use std::sync::LazyLock;

use dex_data::{Ability, RecordKind};

use super::helpers::list;
use crate::dispatch::{RecordSchema, RuleTable};
use crate::error::FieldError;
use crate::version::FormatVersion;

static RULES: LazyLock<RuleTable<Ability>> = LazyLock::new(|| {
    let mut rules: RuleTable<Ability> = HashMap::new();
    rules.insert("Name", |_, a, v| {
        a.name = v.to_string();
        Ok(())
    });
    rules.insert("Description", |_, a, v| {
        a.description = v.to_string();
        Ok(())
    });
    rules.insert("Flags", |_, a, v| {
        a.flags = list(v);
        Ok(())
    });
    rules
});

impl RecordSchema for Ability {
    const KIND: RecordKind = RecordKind::Ability;

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
