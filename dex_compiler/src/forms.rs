//! Alternate forms: split `SPECIES,formId` keys and fill gaps from the base species.

use dex_data::{Pokemon, RecordKind, RecordMap};
use log::info;

use crate::CompileError;

/// Group parsed form records under their base species, ordered by form id.
///
/// # Errors
/// - `MalformedField` when a form key is not `SPECIES,formId`
/// - `MissingReference` when the base species is not loaded
pub fn resolve_forms(
    raw: RecordMap<Pokemon>,
    species: &RecordMap<Pokemon>,
) -> Result<RecordMap<Vec<Pokemon>>, CompileError> {
    let mut grouped: RecordMap<Vec<Pokemon>> = RecordMap::new();
    let total = raw.len();
    for (composite, mut form) in raw {
        let (base_key, form_id) = split_form_key(&composite)?;
        let base = species.get(base_key).ok_or_else(|| CompileError::MissingReference {
            kind: RecordKind::Pokemon,
            key: base_key.to_string(),
            context: format!("form '{composite}'"),
        })?;
        fill_from_base(&mut form, base);
        form.form_id = Some(form_id);
        grouped.entry(base_key.to_string()).or_default().push(form);
    }
    for forms in grouped.values_mut() {
        forms.sort_by_key(|f| f.form_id);
    }
    info!("attached {total} forms to {} species", grouped.len());
    Ok(grouped)
}

fn split_form_key(composite: &str) -> Result<(&str, u32), CompileError> {
    composite
        .split_once(',')
        .and_then(|(base, id)| Some((base.trim(), id.trim().parse::<u32>().ok()?)))
        .filter(|(base, _)| !base.is_empty())
        .ok_or_else(|| CompileError::MalformedField {
            kind: RecordKind::Form,
            key: composite.to_string(),
            field: "[]".to_string(),
            value: composite.to_string(),
            reason: "expected SPECIES,formId".to_string(),
        })
}

fn fill_str(field: &mut String, base: &str) {
    if field.is_empty() {
        base.clone_into(field);
    }
}

fn fill_vec<T: Clone>(field: &mut Vec<T>, base: &[T]) {
    if field.is_empty() {
        *field = base.to_vec();
    }
}

fn fill_num<T: Copy + Default + PartialEq>(field: &mut T, base: T) {
    if *field == T::default() {
        *field = base;
    }
}

/// Every field the form left empty takes the base species' value.
pub fn fill_from_base(form: &mut Pokemon, base: &Pokemon) {
    form.key.clone_from(&base.key);
    form.id = base.id;
    fill_str(&mut form.name, &base.name);
    fill_str(&mut form.category, &base.category);
    fill_str(&mut form.pokedex, &base.pokedex);
    fill_str(&mut form.growth_rate, &base.growth_rate);
    fill_str(&mut form.gender_ratio, &base.gender_ratio);
    fill_str(&mut form.color, &base.color);
    fill_str(&mut form.shape, &base.shape);
    fill_str(&mut form.habitat, &base.habitat);
    fill_vec(&mut form.types, &base.types);
    fill_vec(&mut form.abilities, &base.abilities);
    fill_vec(&mut form.level_moves, &base.level_moves);
    fill_vec(&mut form.line_moves, &base.line_moves);
    fill_vec(&mut form.tutor_moves, &base.tutor_moves);
    fill_vec(&mut form.tribes, &base.tribes);
    fill_vec(&mut form.wild_items, &base.wild_items);
    fill_vec(&mut form.evolutions, &base.evolutions);
    fill_vec(&mut form.egg_groups, &base.egg_groups);
    fill_vec(&mut form.flags, &base.flags);
    fill_num(&mut form.height, base.height);
    fill_num(&mut form.weight, base.weight);
    fill_num(&mut form.catch_rate, base.catch_rate);
    fill_num(&mut form.base_exp, base.base_exp);
    fill_num(&mut form.generation, base.generation);
    if form.base_stats.is_unset() {
        form.base_stats = base.base_stats;
    }
    form.bst = form.base_stats.total();
    form.tree = None;
    form.evolution_tree = None;
}
