//! Persistent settings for the editor.

use crate::sankey::ChartOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_export_scale() -> f32 {
    2.0
}

/// All persistable UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // Chart presentation
    #[serde(default)]
    pub chart: ChartOptions,

    // Export
    /// Overrides the platform download directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Pixels per point in the exported PNG.
    #[serde(default = "default_export_scale")]
    pub export_scale: f32,

    // Layout of the window
    #[serde(default)]
    pub show_chart_options: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chart: ChartOptions::default(),
            export_dir: None,
            export_scale: default_export_scale(),
            show_chart_options: false,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("sankey-native");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, using default settings");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            // File doesn't exist yet, that's fine
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, settings not saved");
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::error!("Failed to write settings file: {}", e);
                } else {
                    tracing::debug!("Saved settings to {:?}", path);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize settings: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chart_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chart.node_thickness, 18.0);
        assert_eq!(settings.chart.node_spacing, 24.0);
        assert!(settings.chart.enable_link_gradient);
        assert_eq!(settings.export_scale, 2.0);
    }

    #[test]
    fn round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let mut settings = Settings::default();
        settings.chart.enable_link_gradient = false;
        settings.export_dir = Some(dir.path().to_path_buf());

        settings.save_to(&path);

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_from(&path), Settings::default());

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn older_files_without_new_fields_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
