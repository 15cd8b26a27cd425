//! Compiler configuration loaded from `dexc.toml`.
//!
//! Every section is optional; missing keys take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::settings::SettingsKeys;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub source: SourceConfig,
    pub files: SourceFiles,
    pub output: OutputConfig,
}

/// Where the data files come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local checkout; when set, `base_url` is ignored.
    pub root: Option<PathBuf>,
    /// URL template; `{revision}` is replaced by the selected revision.
    pub base_url: String,
    pub production_revision: String,
    pub development_revision: String,
    pub version_key: String,
    pub dev_mode_key: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let keys = SettingsKeys::default();
        Self {
            root: None,
            base_url: "https://raw.githubusercontent.com/xeuorux/Pokemon-Tectonic/{revision}".to_string(),
            production_revision: "main".to_string(),
            development_revision: "development".to_string(),
            version_key: keys.version,
            dev_mode_key: keys.dev_mode,
        }
    }
}

/// Resolved data source for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Directory(PathBuf),
    Url(String),
}

impl SourceConfig {
    pub fn revision(&self, dev: bool) -> &str {
        if dev {
            &self.development_revision
        } else {
            &self.production_revision
        }
    }

    pub fn location(&self, dev: bool) -> SourceLocation {
        match &self.root {
            Some(root) => SourceLocation::Directory(root.clone()),
            None => SourceLocation::Url(self.base_url.replace("{revision}", self.revision(dev))),
        }
    }

    pub fn settings_keys(&self) -> SettingsKeys {
        SettingsKeys {
            version: self.version_key.clone(),
            dev_mode: self.dev_mode_key.clone(),
        }
    }
}

/// Source paths per record kind, relative to the source location.
///
/// Kinds with several files are parsed in order; later records with the same
/// key replace earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub settings: String,
    pub types: Vec<String>,
    pub tribes: Vec<String>,
    pub abilities: Vec<String>,
    pub moves: Vec<String>,
    pub items: Vec<String>,
    pub pokemon: Vec<String>,
    pub forms: Vec<String>,
    pub trainer_types: Vec<String>,
    pub trainers: Vec<String>,
    pub encounters: Vec<String>,
}

fn pbs(name: &str) -> Vec<String> {
    vec![format!("PBS/{name}.txt")]
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            settings: "Plugins/_Settings/GameSettings.rb".to_string(),
            types: pbs("types"),
            tribes: pbs("tribes"),
            abilities: pbs("abilities"),
            moves: pbs("moves"),
            items: pbs("items"),
            pokemon: pbs("pokemon"),
            forms: pbs("pokemon_forms"),
            trainer_types: pbs("trainertypes"),
            trainers: pbs("trainers"),
            encounters: pbs("encounters"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub snapshot: PathBuf,
    pub index_store: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("out/dex.json"),
            index_store: PathBuf::from("out/index.ron"),
        }
    }
}

/// Load the compiler configuration, using defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<CompilerConfig> {
    if !path.exists() {
        warn!("no config at '{}'; using defaults", path.display());
        return Ok(CompilerConfig::default());
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
    let config: CompilerConfig =
        toml::from_str(&text).with_context(|| format!("parsing config from '{}'", path.display()))?;
    info!("loaded compiler config from '{}'", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[source]\nroot = \"data\"\n\n[files]\ntrainers = [\"PBS/trainers.txt\", \"PBS/trainers_extra.txt\"]\n"
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.source.location(false), SourceLocation::Directory(PathBuf::from("data")));
        assert_eq!(config.files.trainers.len(), 2);
        assert_eq!(config.files.moves, vec!["PBS/moves.txt"]);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("dexc.toml")).unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source\nroot = 3").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn revision_follows_mode_switch() {
        let source = SourceConfig {
            base_url: "https://example.org/{revision}/data".into(),
            production_revision: "v3".into(),
            development_revision: "dev".into(),
            ..SourceConfig::default()
        };
        assert_eq!(source.location(true), SourceLocation::Url("https://example.org/dev/data".into()));
        assert_eq!(source.location(false), SourceLocation::Url("https://example.org/v3/data".into()));
    }
}
