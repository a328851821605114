//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding note files
    pub notes_dir: Option<PathBuf>,
    /// Editor settings
    pub editor: EditorConfig,
    /// Spell checker settings
    pub spellcheck: SpellcheckConfig,
    /// Plugin settings
    pub plugins: PluginConfig,
}

/// Editor-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in points
    pub font_size: f32,
    /// Auto-save delay after the last change, in seconds (0 = disabled)
    pub autosave_interval: u64,
    /// Underline misspelled words
    pub spellcheck: bool,
}

/// Spell checker settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellcheckConfig {
    /// Locale names to load at startup, e.g. `en_US`
    pub languages: Vec<String>,
    /// Extra directory searched before the system dictionary directories
    pub extra_dict_dir: Option<PathBuf>,
}

/// Plugin settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// IDs of plugins that must not be initialized
    pub disabled: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            autosave_interval: 5,
            spellcheck: true,
        }
    }
}

/// Locale loaded when the configuration names none
pub const DEFAULT_LANGUAGE: &str = "en_US";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "stickynote", "Stickynote")
}

/// Per-user data directory (notes, custom words)
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Get the notes directory
    pub fn get_notes_dir(&self) -> PathBuf {
        self.notes_dir.clone().unwrap_or_else(|| {
            data_dir()
                .map(|dir| dir.join("notes"))
                .unwrap_or_else(|| PathBuf::from("notes"))
        })
    }

    /// Locale names to load, falling back to the default language
    pub fn languages(&self) -> Vec<String> {
        if self.spellcheck.languages.is_empty() {
            vec![DEFAULT_LANGUAGE.to_string()]
        } else {
            self.spellcheck.languages.clone()
        }
    }

    /// Whether a plugin is allowed to initialize
    pub fn plugin_enabled(&self, id: &str) -> bool {
        !self.plugins.disabled.iter().any(|p| p == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "editor": { "font_size": 18.0 } }"#).unwrap();
        assert_eq!(config.editor.font_size, 18.0);
        assert_eq!(config.editor.autosave_interval, 5);
        assert!(config.editor.spellcheck);
        assert_eq!(config.languages(), vec![DEFAULT_LANGUAGE.to_string()]);
    }

    #[test]
    fn test_plugin_enabled() {
        let mut config = AppConfig::default();
        config.plugins.disabled.push("base_integration".to_string());
        assert!(!config.plugin_enabled("base_integration"));
        assert!(config.plugin_enabled("other"));
    }

    #[test]
    fn test_round_trip_json() {
        let mut config = AppConfig::default();
        config.spellcheck.languages = vec!["de_DE".to_string(), "en_GB".to_string()];
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.languages(), config.languages());
    }
}
