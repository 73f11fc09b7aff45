use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, warn};

use crate::ui::settings::Settings;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("dungeon_master");
    fs::create_dir_all(&path).ok();
    path.push("settings.json");
    path
}

/// Loads settings from the user config dir, writing the defaults there on
/// first run so they can be edited.
pub fn load_settings() -> Settings {
    let path = settings_path();

    if !path.exists() {
        let defaults = Settings::default();
        if let Err(e) = save_settings_to(&path, &defaults) {
            warn!(path = %path.display(), error = %e, "could not write default settings");
        }
        return defaults;
    }

    load_settings_from(&path)
}

/// Missing or unparsable files fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring malformed settings");
            Settings::default()
        }),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no settings file, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn api_key_from_env() -> anyhow::Result<String> {
    api_key_from(std::env::var(API_KEY_VAR).ok())
}

pub fn api_key_from(value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => bail!("Missing {} in environment", API_KEY_VAR),
    }
}
