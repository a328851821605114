//! Default desktop integration: show the note and give it focus

use super::api::{DeIntegration, HostContext, NoteActivation, Plugin, PluginMetadata};

pub const PLUGIN_ID: &str = "base_integration";

/// Integration used when no desktop-specific plugin is available
#[derive(Debug, Default)]
pub struct BaseIntegration {
    initialized: bool,
}

impl BaseIntegration {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for BaseIntegration {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            id: PLUGIN_ID.to_string(),
            name: "Base Integration".to_string(),
            description: "Shows activated notes and focuses their editor".to_string(),
            author: "Stickynote Contributors".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            homepage: None,
        }
    }

    fn init(&mut self, ctx: &HostContext) -> bool {
        tracing::debug!(
            "Base integration ready (host {}, notes in {}, data in {})",
            ctx.host_version,
            ctx.notes_dir.display(),
            ctx.data_dir.display()
        );
        self.initialized = true;
        true
    }

    fn de_integration(&mut self) -> Option<&mut dyn DeIntegration> {
        Some(self)
    }
}

impl DeIntegration for BaseIntegration {
    fn activate_note(&mut self, note: &mut NoteActivation) {
        if !self.initialized {
            return;
        }
        note.visible = true;
        note.focus_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::manager::{PluginManager, PluginState};

    #[test]
    fn test_activation_shows_and_focuses() {
        let mut manager = PluginManager::new();
        manager.register(Box::new(BaseIntegration::new()));
        manager.init_all(&HostContext::default(), |_| true);
        assert_eq!(manager.state(PLUGIN_ID), Some(PluginState::Active));

        let mut note = NoteActivation::new("1700000000000");
        manager.activate_note(&mut note);
        assert!(note.visible);
        assert!(note.focus_requested);
    }

    #[test]
    fn test_metadata_is_stable() {
        let plugin = BaseIntegration::new();
        assert_eq!(plugin.metadata(), plugin.metadata());
        assert_eq!(plugin.metadata().id, PLUGIN_ID);
    }
}
