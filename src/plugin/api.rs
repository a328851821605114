//! Plugin API definitions

use std::path::PathBuf;

/// Context handed to plugins during `init`
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Per-user data directory
    pub data_dir: PathBuf,
    /// Directory holding note files
    pub notes_dir: PathBuf,
    /// Host application version
    pub host_version: &'static str,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            notes_dir: PathBuf::from("notes"),
            host_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Static description of a plugin
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PluginMetadata {
    /// Unique plugin ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Plugin description
    pub description: String,
    /// Plugin author
    pub author: String,
    /// Plugin version
    pub version: String,
    /// Project homepage
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Plugin trait that all plugins must implement
pub trait Plugin {
    /// Describe the plugin. Must not have side effects.
    fn metadata(&self) -> PluginMetadata;

    /// One-time setup. Returning `false` marks the plugin unavailable.
    fn init(&mut self, ctx: &HostContext) -> bool;

    /// Desktop integration capability, if the plugin has it
    fn de_integration(&mut self) -> Option<&mut dyn DeIntegration> {
        None
    }
}

/// Note being brought to the user's attention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActivation {
    /// ID of the note
    pub note_id: String,
    /// Whether the note is shown
    pub visible: bool,
    /// Whether the editor should take keyboard focus
    pub focus_requested: bool,
}

impl NoteActivation {
    pub fn new(note_id: impl Into<String>) -> Self {
        Self {
            note_id: note_id.into(),
            visible: false,
            focus_requested: false,
        }
    }
}

/// Integration with the desktop environment
pub trait DeIntegration {
    /// Show, raise, or otherwise surface a note. May do nothing.
    fn activate_note(&mut self, note: &mut NoteActivation);
}
