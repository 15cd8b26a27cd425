//! Version and development flag read from the game's settings script.
//!
//! This is a plain `NAME = value` line scan; the script is never evaluated.

use crate::CompileError;

/// Constant names looked up in the settings script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsKeys {
    pub version: String,
    pub dev_mode: String,
}

impl Default for SettingsKeys {
    fn default() -> Self {
        Self {
            version: "GAME_VERSION".to_string(),
            dev_mode: "DEV_VERSION".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub version: String,
    pub dev_mode: bool,
}

/// Scan `text` for the version constant and the development flag.
///
/// The first assignment of each name wins. A missing development flag reads
/// as `false`.
///
/// # Errors
/// - `Settings` when the version constant is absent or empty
pub fn scan_settings(text: &str, keys: &SettingsKeys) -> Result<Settings, CompileError> {
    let mut version = None;
    let mut dev_mode = None;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if value.starts_with('=') {
            continue;
        }
        let value = strip_value(value);
        if name == keys.version && version.is_none() {
            version = Some(value.to_string());
        } else if name == keys.dev_mode && dev_mode.is_none() {
            dev_mode = Some(value.eq_ignore_ascii_case("true"));
        }
    }
    let version = version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CompileError::Settings(format!("no value assigned to {}", keys.version)))?;
    Ok(Settings {
        version,
        dev_mode: dev_mode.unwrap_or(false),
    })
}

/// Drop a trailing comment and surrounding quotes.
fn strip_value(raw: &str) -> &str {
    let raw = raw.trim();
    if let Some(quoted) = raw.strip_prefix(['"', '\'']) {
        return quoted.split(['"', '\'']).next().unwrap_or_default();
    }
    raw.split('#').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
# Game settings
module Settings
  # GAME_VERSION = "0.0.1"
  GAME_VERSION = "3.1.2" # bump on release
  DEV_VERSION  = true
  GAME_VERSION = "9.9.9"
  MAX_LEVEL == 100
end
"#;

    #[test]
    fn reads_first_assignment_of_each_key() {
        let settings = scan_settings(SCRIPT, &SettingsKeys::default()).unwrap();
        assert_eq!(settings.version, "3.1.2");
        assert!(settings.dev_mode);
    }

    #[test]
    fn custom_keys_and_missing_flag() {
        let keys = SettingsKeys {
            version: "DATA_VERSION".into(),
            dev_mode: "BETA".into(),
        };
        let settings = scan_settings("DATA_VERSION = 2.4\n", &keys).unwrap();
        assert_eq!(settings.version, "2.4");
        assert!(!settings.dev_mode);
    }

    #[test]
    fn missing_version_is_an_error() {
        assert!(matches!(
            scan_settings("DEV_VERSION = false\n", &SettingsKeys::default()),
            Err(CompileError::Settings(_))
        ));
    }
}
