//! Writing the compiled snapshot and the version-keyed index store.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dex_data::{DexSnapshot, IndexStore, IndexTable};
use log::info;
use ron::ser::PrettyConfig;

use crate::CompileError;
use crate::config::OutputConfig;

fn write_file(path: &Path, contents: &str) -> Result<(), CompileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CompileError::Output {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| CompileError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the snapshot as pretty JSON.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn write_snapshot(snapshot: &DexSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("serializing dex snapshot")?;
    write_file(path, &json)?;
    info!("wrote snapshot for version {} to '{}'", snapshot.version, path.display());
    Ok(())
}

/// Load the index store at `path`; a missing file is an empty store.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_index_store(path: &Path) -> Result<IndexStore> {
    if !path.exists() {
        return Ok(IndexStore::default());
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading index store '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing index store '{}'", path.display()))
}

/// Insert the snapshot's index table under its version, keeping other versions.
///
/// # Errors
/// Returns an error if the existing store is unreadable or the write fails.
pub fn update_index_store(snapshot: &DexSnapshot, path: &Path) -> Result<IndexStore> {
    let mut store = load_index_store(path)?;
    if store
        .insert(&snapshot.version, IndexTable::from_snapshot(snapshot))
        .is_some()
    {
        info!("replacing index table for version {}", snapshot.version);
    }
    let text = ron::ser::to_string_pretty(&store, PrettyConfig::default()).context("serializing index store")?;
    write_file(path, &text)?;
    info!("index store '{}' now holds {} versions", path.display(), store.versions.len());
    Ok(store)
}

/// Write every artifact of a successful compilation.
///
/// # Errors
/// Returns an error if any artifact cannot be written.
pub fn write_outputs(snapshot: &DexSnapshot, output: &OutputConfig) -> Result<()> {
    write_snapshot(snapshot, &output.snapshot)?;
    update_index_store(snapshot, &output.index_store)?;
    Ok(())
}
