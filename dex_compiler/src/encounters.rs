//! Wild encounter files: `[id] # name` maps, unindented `type,rate` tables,
//! and space-indented `weight,species[_form],minLevel[,maxLevel]` entries.
//!
//! Nesting is resolved in a single pass without lookahead; the raw blocks are
//! then converted to typed records.

use dex_data::{Encounter, EncounterMap, EncounterTable, RecordKind, RecordMap};
use log::{debug, warn};

use crate::CompileError;
use crate::error::FieldError;
use crate::schema::helpers::{list, number};

struct RawTable<'a> {
    header: &'a str,
    entries: Vec<&'a str>,
}

struct RawMap<'a> {
    line: usize,
    header: &'a str,
    tables: Vec<RawTable<'a>>,
}

/// Parse an encounters file into `into`, returning how many maps were read.
///
/// # Errors
/// - `MalformedLine` for tables outside a map or entries outside a table
/// - `MalformedField` for unparsable headers or entries
pub fn parse_encounters(text: &str, into: &mut RecordMap<EncounterMap>) -> Result<usize, CompileError> {
    let raw_maps = collect_blocks(text)?;
    let count = raw_maps.len();
    for raw in raw_maps {
        let map = map_from_raw(&raw)?;
        if into.insert(map.key.clone(), map).is_some() {
            warn!("encounter map at data line {} redefines an earlier map", raw.line);
        }
    }
    debug!("parsed {count} encounter maps");
    Ok(count)
}

fn collect_blocks(text: &str) -> Result<Vec<RawMap<'_>>, CompileError> {
    let mut maps = Vec::new();
    let mut current_map: Option<RawMap<'_>> = None;
    let mut current_table: Option<RawTable<'_>> = None;

    for (index, raw_line) in text.trim_start_matches('\u{feff}').lines().enumerate() {
        let number = index + 1;
        let line = raw_line.trim_end();
        let content = line.trim_start();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            flush_table(&mut current_map, &mut current_table);
            maps.extend(current_map.take());
            current_map = Some(RawMap {
                line: number,
                header: line,
                tables: Vec::new(),
            });
        } else if line.starts_with([' ', '\t']) {
            let Some(table) = current_table.as_mut() else {
                return Err(malformed_line(number, line, "encounter entry outside a table"));
            };
            table.entries.push(content);
        } else {
            if current_map.is_none() {
                return Err(malformed_line(number, line, "encounter table outside a map"));
            }
            flush_table(&mut current_map, &mut current_table);
            current_table = Some(RawTable {
                header: line,
                entries: Vec::new(),
            });
        }
    }

    flush_table(&mut current_map, &mut current_table);
    maps.extend(current_map.take());
    Ok(maps)
}

fn flush_table<'a>(map: &mut Option<RawMap<'a>>, table: &mut Option<RawTable<'a>>) {
    if let (Some(map), Some(table)) = (map.as_mut(), table.take()) {
        map.tables.push(table);
    }
}

fn malformed_line(line: usize, text: &str, message: &'static str) -> CompileError {
    CompileError::MalformedLine {
        kind: RecordKind::EncounterMap,
        line,
        text: text.to_string(),
        message,
    }
}

fn map_from_raw(raw: &RawMap<'_>) -> Result<EncounterMap, CompileError> {
    let mut map = parse_header(raw.header).map_err(|e| malformed_field("", "header", raw.header, &e))?;
    for table in &raw.tables {
        let mut typed = parse_table_header(table.header).map_err(|e| malformed_field(&map.key, "table", table.header, &e))?;
        for entry in &table.entries {
            typed
                .encounters
                .push(parse_entry(entry).map_err(|e| malformed_field(&map.key, "entry", entry, &e))?);
        }
        map.tables.push(typed);
    }
    Ok(map)
}

fn malformed_field(key: &str, field: &str, value: &str, err: &FieldError) -> CompileError {
    CompileError::MalformedField {
        kind: RecordKind::EncounterMap,
        key: if key.is_empty() { "<unkeyed>".to_string() } else { key.to_string() },
        field: field.to_string(),
        value: value.to_string(),
        reason: err.to_string(),
    }
}

/// `[002] # Route 1` or `[002,1] # Route 1`.
fn parse_header(header: &str) -> Result<EncounterMap, FieldError> {
    let (interior, rest) = header
        .strip_prefix('[')
        .and_then(|h| h.split_once(']'))
        .ok_or_else(|| FieldError::Invalid("expected '[id]'".to_string()))?;
    let pieces = list(interior);
    let (id, version) = match pieces.as_slice() {
        [id] => (number(id)?, None),
        [id, version] => (number(id)?, Some(number(version)?)),
        _ => {
            return Err(FieldError::WrongArity {
                expected: "id[,version]",
                found: pieces.len(),
            });
        },
    };
    Ok(EncounterMap {
        key: pieces.join(","),
        id,
        version,
        name: rest.trim().trim_start_matches('#').trim().to_string(),
        tables: Vec::new(),
    })
}

/// `Land,21` or `OldRod`.
fn parse_table_header(header: &str) -> Result<EncounterTable, FieldError> {
    let pieces = list(header);
    let (kind, rate) = match pieces.as_slice() {
        [kind] => (kind.clone(), None),
        [kind, rate] => (kind.clone(), Some(number(rate)?)),
        _ => {
            return Err(FieldError::WrongArity {
                expected: "type[,rate]",
                found: pieces.len(),
            });
        },
    };
    Ok(EncounterTable {
        kind,
        rate,
        encounters: Vec::new(),
    })
}

/// `weight,species[_form],minLevel[,maxLevel]`.
fn parse_entry(entry: &str) -> Result<Encounter, FieldError> {
    let pieces = list(entry);
    let (weight, species, min_level, max_level) = match pieces.as_slice() {
        [w, s, min] => (w, s, number(min)?, None),
        [w, s, min, max] => (w, s, number(min)?, Some(number(max)?)),
        _ => {
            return Err(FieldError::WrongArity {
                expected: "weight,species,minLevel[,maxLevel]",
                found: pieces.len(),
            });
        },
    };
    let (pokemon, form) = split_form(species);
    Ok(Encounter {
        weight: number(weight)?,
        pokemon,
        form,
        min_level,
        max_level: max_level.unwrap_or(min_level),
    })
}

/// `RATTATA_1` → (`RATTATA`, 1); a non-numeric suffix stays part of the key.
fn split_form(species: &str) -> (String, Option<u32>) {
    if let Some((base, form)) = species.rsplit_once('_')
        && let Ok(form) = form.parse()
    {
        return (base.to_string(), Some(form));
    }
    (species.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_map_one_table_two_entries() {
        let text = "\
#-------------------------------
[002] # Route 1
Land,21
    20,RATTATA_1,2,4
    30,PIDGEY,3
";
        let mut maps = RecordMap::new();
        assert_eq!(parse_encounters(text, &mut maps).unwrap(), 1);
        let map = &maps["002"];
        assert_eq!(map.id, 2);
        assert_eq!(map.name, "Route 1");
        assert_eq!(map.tables.len(), 1);
        let table = &map.tables[0];
        assert_eq!(table.kind, "Land");
        assert_eq!(table.rate, Some(21));
        assert_eq!(
            table.encounters,
            vec![
                Encounter {
                    weight: 20,
                    pokemon: "RATTATA".into(),
                    form: Some(1),
                    min_level: 2,
                    max_level: 4
                },
                Encounter {
                    weight: 30,
                    pokemon: "PIDGEY".into(),
                    form: None,
                    min_level: 3,
                    max_level: 3
                },
            ]
        );
    }

    #[test]
    fn new_map_flushes_open_table_and_map() {
        let text = "\
[003,1] # Viridian Forest
Land,21
  50,CATERPIE,3
OldRod
  100,MAGIKARP,5,10
[004]
Cave
  100,ZUBAT,6
";
        let mut maps = RecordMap::new();
        assert_eq!(parse_encounters(text, &mut maps).unwrap(), 2);
        let forest = &maps["003,1"];
        assert_eq!(forest.version, Some(1));
        assert_eq!(forest.tables.len(), 2);
        assert_eq!(forest.tables[1].rate, None);
        assert_eq!(forest.tables[1].encounters[0].max_level, 10);
        assert_eq!(maps["004"].name, "");
        assert_eq!(maps["004"].tables[0].encounters.len(), 1);
    }

    #[test]
    fn entry_before_table_is_malformed() {
        let err = parse_encounters("[001]\n  10,PIDGEY,2\n", &mut RecordMap::new()).unwrap_err();
        assert!(matches!(err, CompileError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn underscore_without_number_is_kept() {
        assert_eq!(split_form("MR_MIME"), ("MR_MIME".to_string(), None));
    }
}
