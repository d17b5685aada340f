//! Configuration module for speaker-events
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "SPEAKER_EVENTS_SETTINGS_PATH";

/// Load settings from the first settings file found, or defaults.
///
/// Lookup order: `$SPEAKER_EVENTS_SETTINGS_PATH`, the path given on the
/// command line, then the default locations. Environment overrides are
/// applied on top in every case.
pub fn load(explicit: Option<PathBuf>) -> Result<Settings> {
    if let Some(path) = explicit.as_ref().filter(|p| !p.exists()) {
        bail!("settings file not found: {}", path.display());
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        candidates.push(PathBuf::from(path));
    }
    candidates.extend(explicit);
    candidates.extend(default_paths());

    let mut settings = match candidates.iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("speaker-events/settings.yml"));
    }
    paths
}
