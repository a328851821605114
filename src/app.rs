//! Main application state and UI coordination

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::config::{data_dir, AppConfig};
use crate::core::note::Note;
use crate::core::storage::{NoteStorage, NoteSummary};
use crate::plugin::api::{HostContext, NoteActivation};
use crate::plugin::base_integration::{self, BaseIntegration};
use crate::plugin::manager::{PluginManager, PluginState};
use crate::spell::custom_dict::CUSTOM_WORDS_FILE;
use crate::spell::{CustomDictionary, DictionaryLocator, Locale, SpellChecker};
use crate::ui::{
    editor::{EditorPanel, MisspellingCache},
    note_manager::NoteManagerWindow,
    settings::{DictionariesWindow, PluginsWindow},
};

/// Main application state
pub struct StickyNoteApp {
    /// Application configuration
    pub config: AppConfig,
    /// Note storage, if the notes directory could be opened
    pub storage: Option<NoteStorage>,
    /// Open notes indexed by ID
    pub notes: HashMap<String, Note>,
    /// Currently active note ID
    pub active_note: Option<String>,
    /// Cached listing for the note manager
    pub note_list: Vec<NoteSummary>,
    /// Spell checker shared by all editors
    pub spell: SpellChecker,
    /// Misspelled ranges of the last laid out text
    pub spell_cache: MisspellingCache,
    /// Plugin manager
    pub plugin_manager: PluginManager,
    /// Locales with installed dictionaries, refreshed when the dialog opens
    pub available_languages: Vec<Locale>,
    /// Search text in the note manager
    pub manager_query: String,
    /// Whether the note manager is visible
    pub manager_visible: bool,
    /// Whether the dictionaries dialog is visible
    pub dictionaries_visible: bool,
    /// Whether the plugins dialog is visible
    pub plugins_visible: bool,
    /// Editor should grab keyboard focus on the next frame
    pub focus_editor: bool,
}

impl StickyNoteApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {}", e);
            AppConfig::default()
        });

        let mut app = Self::with_config(config, data_dir());
        app.refresh_notes();
        if let Some(first) = app.note_list.first().map(|n| n.id.clone()) {
            app.open_note(&first);
        }
        app
    }

    /// Build application state without a window. Custom words live in
    /// `data_dir`; without one they are kept in memory only.
    pub fn with_config(config: AppConfig, data_dir: Option<PathBuf>) -> Self {
        let notes_dir = config.get_notes_dir();
        let storage = match NoteStorage::open(&notes_dir) {
            Ok(storage) => Some(storage),
            Err(e) => {
                tracing::error!("Notes are unavailable: {:#}", e);
                None
            }
        };

        let custom = match &data_dir {
            Some(dir) => CustomDictionary::load(dir.join(CUSTOM_WORDS_FILE)),
            None => CustomDictionary::in_memory(),
        };
        let spell = Self::build_spell_checker(&config, custom);

        let mut plugin_manager = PluginManager::new();
        plugin_manager.register(Box::new(BaseIntegration::new()));
        let ctx = HostContext {
            data_dir: data_dir.unwrap_or_else(|| notes_dir.clone()),
            notes_dir,
            ..HostContext::default()
        };
        plugin_manager.init_all(&ctx, |id| config.plugin_enabled(id));
        if plugin_manager.state(base_integration::PLUGIN_ID) != Some(PluginState::Active) {
            tracing::info!("Base integration is off, opened notes will not take focus");
        }

        Self {
            config,
            storage,
            notes: HashMap::new(),
            active_note: None,
            note_list: Vec::new(),
            spell,
            spell_cache: MisspellingCache::default(),
            plugin_manager,
            available_languages: Vec::new(),
            manager_query: String::new(),
            manager_visible: false,
            dictionaries_visible: false,
            plugins_visible: false,
            focus_editor: false,
        }
    }

    /// Create the spell checker and load the configured languages
    fn build_spell_checker(config: &AppConfig, custom: CustomDictionary) -> SpellChecker {
        let locator = match &config.spellcheck.extra_dict_dir {
            Some(dir) => DictionaryLocator::with_extra_dir(dir.clone()),
            None => DictionaryLocator::system(),
        };

        let mut spell = SpellChecker::new(locator, custom);
        for name in config.languages() {
            match name.parse::<Locale>() {
                Ok(locale) => {
                    if !spell.add_language(&locale) {
                        tracing::warn!("No usable dictionary for {}", name);
                    }
                }
                Err(e) => tracing::warn!("Ignoring language in config: {}", e),
            }
        }
        spell
    }

    /// Reload the note listing
    pub fn refresh_notes(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        match storage.list() {
            Ok(list) => self.note_list = list,
            Err(e) => tracing::error!("Failed to list notes: {:#}", e),
        }
    }

    /// Create a new note and open it
    pub fn new_note(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        match storage.create() {
            Ok(note) => {
                let id = note.id.clone();
                self.notes.insert(id.clone(), note);
                self.refresh_notes();
                self.activate(&id);
            }
            Err(e) => tracing::error!("Failed to create note: {:#}", e),
        }
    }

    /// Open a note by ID and bring it forward
    pub fn open_note(&mut self, id: &str) {
        if !self.notes.contains_key(id) {
            let Some(storage) = &self.storage else {
                return;
            };
            match storage.load(id) {
                Ok(note) => {
                    self.notes.insert(id.to_string(), note);
                }
                Err(e) => {
                    tracing::error!("Failed to open note: {:#}", e);
                    return;
                }
            }
        }
        self.activate(id);
    }

    /// Show a note, letting desktop integrations raise and focus it
    fn activate(&mut self, id: &str) {
        self.active_note = Some(id.to_string());

        let mut activation = NoteActivation::new(id);
        self.plugin_manager.activate_note(&mut activation);
        self.focus_editor = activation.focus_requested;
    }

    /// Close an open note, saving pending changes
    pub fn close_note(&mut self, id: &str) {
        if let Some(mut note) = self.notes.remove(id) {
            if note.modified {
                if let Err(e) = note.save() {
                    tracing::error!("Failed to save note: {:#}", e);
                }
            }
        }
        if self.active_note.as_deref() == Some(id) {
            self.active_note = self.notes.keys().next().cloned();
        }
    }

    /// Save the active note
    pub fn save_active_note(&mut self) {
        if let Some(note) = self.active_note_mut() {
            if let Err(e) = note.save() {
                tracing::error!("Failed to save note: {:#}", e);
            }
        }
        self.refresh_notes();
    }

    /// Export the active note to a user-chosen file
    pub fn export_active_note(&mut self) {
        let Some(note) = self.active_note() else {
            return;
        };
        let file_name = format!("{}.txt", sanitize_file_name(&note.title()));
        if let Some(target) = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter("Text", &["txt"])
            .save_file()
        {
            if let Err(e) = note.export(&target) {
                tracing::error!("{:#}", e);
            }
        }
    }

    /// Delete a note from disk
    pub fn delete_note(&mut self, id: &str) {
        self.notes.remove(id);
        if self.active_note.as_deref() == Some(id) {
            self.active_note = self.notes.keys().next().cloned();
        }
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.delete(id) {
                tracing::error!("{:#}", e);
            }
        }
        self.refresh_notes();
    }

    /// Save notes whose last edit is older than the autosave interval
    pub fn autosave(&mut self, now: Instant) {
        let interval = Duration::from_secs(self.config.editor.autosave_interval);
        let mut saved = false;
        for note in self.notes.values_mut() {
            if note.needs_autosave(interval, now) {
                match note.save() {
                    Ok(()) => saved = true,
                    Err(e) => tracing::error!("Autosave failed: {:#}", e),
                }
            }
        }
        if saved {
            self.refresh_notes();
        }
    }

    /// Load another dictionary and remember it in the config
    pub fn add_language(&mut self, locale: &Locale) -> bool {
        if !self.spell.add_language(locale) {
            return false;
        }
        let name = locale.name();
        if !self.config.spellcheck.languages.contains(&name) {
            self.config.spellcheck.languages.push(name);
            if let Err(e) = self.config.save() {
                tracing::error!("Failed to save config: {:#}", e);
            }
        }
        true
    }

    /// Get the active note mutably
    pub fn active_note_mut(&mut self) -> Option<&mut Note> {
        self.active_note
            .as_ref()
            .and_then(|id| self.notes.get_mut(id))
    }

    /// Get the active note
    pub fn active_note(&self) -> Option<&Note> {
        self.active_note
            .as_ref()
            .and_then(|id| self.notes.get(id))
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Note", |ui| {
                    if ui.button("New").clicked() {
                        self.new_note();
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        self.save_active_note();
                        ui.close();
                    }
                    if ui.button("Save As...").clicked() {
                        self.export_active_note();
                        ui.close();
                    }
                    if ui.button("Close").clicked() {
                        if let Some(id) = self.active_note.clone() {
                            self.close_note(&id);
                        }
                        ui.close();
                    }
                    if ui.button("Delete").clicked() {
                        if let Some(id) = self.active_note.clone() {
                            self.delete_note(&id);
                        }
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Note Manager").clicked() {
                        self.manager_visible = !self.manager_visible;
                        ui.close();
                    }
                    if ui
                        .checkbox(&mut self.config.editor.spellcheck, "Check Spelling")
                        .changed()
                    {
                        if let Err(e) = self.config.save() {
                            tracing::error!("Failed to save config: {:#}", e);
                        }
                    }
                });

                ui.menu_button("Tools", |ui| {
                    if ui.button("Dictionaries...").clicked() {
                        self.available_languages = self.spell.supported_languages();
                        self.dictionaries_visible = true;
                        ui.close();
                    }
                    if ui.button("Plugins...").clicked() {
                        self.plugins_visible = true;
                        ui.close();
                    }
                });
            });
        });
    }
}

impl eframe::App for StickyNoteApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        let (save, new, manager) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::S),
                i.modifiers.command && i.key_pressed(egui::Key::N),
                i.modifiers.command && i.key_pressed(egui::Key::M),
            )
        });
        if save {
            self.save_active_note();
        }
        if new {
            self.new_note();
        }
        if manager {
            self.manager_visible = !self.manager_visible;
        }

        self.autosave(Instant::now());
        if self.notes.values().any(|note| note.modified) {
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        self.render_menu_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            EditorPanel::show(ui, self);
        });

        NoteManagerWindow::show(ctx, self);
        DictionariesWindow::show(ctx, self);
        PluginsWindow::show(ctx, self);
    }
}

impl Drop for StickyNoteApp {
    fn drop(&mut self) {
        for note in self.notes.values_mut().filter(|note| note.modified) {
            if let Err(e) = note.save() {
                tracing::error!("Failed to save note on exit: {:#}", e);
            }
        }
    }
}

/// Replace characters that are not allowed in file names
fn sanitize_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "note".to_string()
    } else {
        cleaned.to_string()
    }
}
