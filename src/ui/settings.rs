//! Dictionary and plugin dialogs

use eframe::egui;

use crate::app::StickyNoteApp;
use crate::plugin::manager::PluginState;

/// Loaded and installable spell checking dictionaries
pub struct DictionariesWindow;

impl DictionariesWindow {
    pub fn show(ctx: &egui::Context, app: &mut StickyNoteApp) {
        if !app.dictionaries_visible {
            return;
        }

        let mut open = true;
        let mut to_load = None;
        egui::Window::new("Dictionaries")
            .open(&mut open)
            .default_width(320.0)
            .show(ctx, |ui| {
                let loaded = app.spell.loaded_dicts();

                ui.strong("Loaded");
                if loaded.is_empty() {
                    ui.weak("No dictionary loaded, spell checking is inactive");
                }
                for dict in &loaded {
                    let name = match &dict.country {
                        Some(country) => format!("{}_{}", dict.language, country),
                        None => dict.language.clone(),
                    };
                    ui.label(name)
                        .on_hover_text(dict.filename.display().to_string());
                }

                ui.separator();
                ui.strong("Installed");
                let mut any = false;
                for locale in &app.available_languages {
                    let is_loaded = loaded.iter().any(|d| {
                        d.language == locale.language() && d.country.as_deref() == locale.country()
                    });
                    if is_loaded {
                        continue;
                    }
                    any = true;
                    ui.horizontal(|ui| {
                        ui.label(locale.name());
                        if ui.small_button("Load").clicked() {
                            to_load = Some(locale.clone());
                        }
                    });
                }
                if !any {
                    ui.weak("Nothing else to load");
                }

                ui.separator();
                let custom = app.spell.custom_words();
                egui::CollapsingHeader::new(format!("Custom words ({})", custom.len()))
                    .id_salt("custom_words")
                    .show(ui, |ui| {
                        if let Some(path) = custom.path() {
                            ui.weak(path.display().to_string());
                        }
                        if custom.is_empty() {
                            ui.weak("Use \"Add to dictionary\" in the editor's context menu");
                        }
                        egui::ScrollArea::vertical()
                            .id_salt("custom_words_scroll")
                            .max_height(160.0)
                            .show(ui, |ui| {
                                for word in custom.words() {
                                    ui.label(word);
                                }
                            });
                    });

                egui::CollapsingHeader::new("Searched folders")
                    .id_salt("dict_dirs")
                    .show(ui, |ui| {
                        for dir in app.spell.search_dirs() {
                            ui.monospace(dir.display().to_string());
                        }
                    });
            });

        app.dictionaries_visible = open;
        if let Some(locale) = to_load {
            if !app.add_language(&locale) {
                tracing::warn!("Could not load dictionary {}", locale);
            }
        }
    }
}

/// Registered plugins and their state
pub struct PluginsWindow;

impl PluginsWindow {
    pub fn show(ctx: &egui::Context, app: &mut StickyNoteApp) {
        if !app.plugins_visible {
            return;
        }

        let mut open = true;
        egui::Window::new("Plugins")
            .open(&mut open)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.weak(format!("{} registered", app.plugin_manager.plugin_count()));
                ui.separator();
                for (metadata, state) in app.plugin_manager.plugins() {
                    ui.horizontal(|ui| {
                        ui.strong(metadata.name.as_str());
                        ui.weak(format!("v{}", metadata.version));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(state_label(state));
                        });
                    });
                    ui.label(metadata.description.as_str());
                    ui.weak(format!("by {}", metadata.author));
                    if let Some(homepage) = &metadata.homepage {
                        ui.hyperlink(homepage);
                    }
                    ui.separator();
                }
            });
        app.plugins_visible = open;
    }
}

fn state_label(state: PluginState) -> &'static str {
    match state {
        PluginState::Registered => "Pending",
        PluginState::Active => "Active",
        PluginState::Unavailable => "Unavailable",
        PluginState::Disabled => "Disabled",
    }
}
