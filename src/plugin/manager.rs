//! Plugin manager for registering and initializing plugins

use std::collections::HashMap;

use super::api::{HostContext, NoteActivation, Plugin, PluginMetadata};

/// Lifecycle state of a registered plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Registered, `init` not called yet
    Registered,
    /// `init` succeeded
    Active,
    /// `init` returned false
    Unavailable,
    /// Turned off in the configuration
    Disabled,
}

struct PluginSlot {
    plugin: Box<dyn Plugin>,
    metadata: PluginMetadata,
    state: PluginState,
}

/// Plugin manager
#[derive(Default)]
pub struct PluginManager {
    /// Registered plugins by ID
    plugins: HashMap<String, PluginSlot>,
    /// Plugin IDs in registration order
    order: Vec<String>,
}

impl PluginManager {
    /// Create a new plugin manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A second plugin with the same ID is ignored.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> bool {
        let metadata = plugin.metadata();
        if self.plugins.contains_key(&metadata.id) {
            tracing::warn!("Plugin {} is already registered", metadata.id);
            return false;
        }

        tracing::debug!("Registered plugin: {} v{}", metadata.name, metadata.version);
        self.order.push(metadata.id.clone());
        self.plugins.insert(
            metadata.id.clone(),
            PluginSlot {
                plugin,
                metadata,
                state: PluginState::Registered,
            },
        );
        true
    }

    /// Initialize every registered plugin once. `enabled` filters by ID.
    pub fn init_all(&mut self, ctx: &HostContext, enabled: impl Fn(&str) -> bool) {
        for id in &self.order {
            let Some(slot) = self.plugins.get_mut(id) else {
                continue;
            };
            if slot.state != PluginState::Registered {
                continue;
            }

            if !enabled(id.as_str()) {
                slot.state = PluginState::Disabled;
                tracing::info!("Plugin {} is disabled", id);
                continue;
            }

            if slot.plugin.init(ctx) {
                slot.state = PluginState::Active;
                tracing::info!("Loaded plugin: {} v{}", slot.metadata.name, slot.metadata.version);
            } else {
                slot.state = PluginState::Unavailable;
                tracing::warn!("Plugin {} failed to initialize", id);
            }
        }
    }

    /// Let every active desktop integration surface the note
    pub fn activate_note(&mut self, note: &mut NoteActivation) {
        for id in &self.order {
            let Some(slot) = self.plugins.get_mut(id) else {
                continue;
            };
            if slot.state != PluginState::Active {
                continue;
            }
            if let Some(integration) = slot.plugin.de_integration() {
                tracing::debug!("Activating note {} via {}", note.note_id, id);
                integration.activate_note(note);
            }
        }
    }

    /// Metadata and state of every plugin, in registration order
    pub fn plugins(&self) -> Vec<(&PluginMetadata, PluginState)> {
        self.order
            .iter()
            .filter_map(|id| self.plugins.get(id))
            .map(|slot| (&slot.metadata, slot.state))
            .collect()
    }

    /// State of one plugin
    pub fn state(&self, id: &str) -> Option<PluginState> {
        self.plugins.get(id).map(|slot| slot.state)
    }

    /// Get plugin count
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }
}
