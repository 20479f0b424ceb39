use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::Settings;

const APP_DIR_NAME: &str = "ChatOverlay";
const SETTINGS_FILE: &str = "settings.json";

/// Per-user application data directory, created on first use.
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find local data directory"))?;

    // Keep development data apart from a release install
    let app_dir = if cfg!(debug_assertions) {
        base.join(format!("{}.dev", APP_DIR_NAME))
    } else {
        base.join(APP_DIR_NAME)
    };

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    }

    Ok(app_dir)
}

pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(SETTINGS_FILE))
}

/// Load settings from the app data directory, falling back to defaults
/// when no settings file exists yet.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &get_settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("[Settings] No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

    Ok(settings)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write settings file {}", path.display()))?;

    debug!("[Settings] Saved settings to {}", path.display());
    Ok(())
}
