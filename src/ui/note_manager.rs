//! Note manager window: list, search, open and delete notes

use std::time::{Duration, SystemTime};

use eframe::egui;

use crate::app::StickyNoteApp;

/// Requested change from the window, applied after drawing
enum ManagerAction {
    Open(String),
    Delete(String),
    Create,
    Refresh,
}

/// Note manager window
pub struct NoteManagerWindow;

impl NoteManagerWindow {
    /// Show the note manager window
    pub fn show(ctx: &egui::Context, app: &mut StickyNoteApp) {
        if !app.manager_visible {
            return;
        }

        let mut open = true;
        let mut action = None;
        egui::Window::new("Notes")
            .open(&mut open)
            .default_width(360.0)
            .default_height(420.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Search:");
                    ui.text_edit_singleline(&mut app.manager_query);
                    if ui.button("New").clicked() {
                        action = Some(ManagerAction::Create);
                    }
                    if ui.small_button("\u{21BB}").on_hover_text("Refresh").clicked() {
                        action = Some(ManagerAction::Refresh);
                    }
                });
                ui.separator();

                let Some(storage) = &app.storage else {
                    ui.colored_label(ui.visuals().error_fg_color, "Notes directory is unavailable");
                    return;
                };
                ui.weak(storage.dir().display().to_string());

                egui::ScrollArea::vertical()
                    .id_salt("note_manager_scroll")
                    .show(ui, |ui| {
                        let query = app.manager_query.trim();
                        let mut shown = 0;
                        for note in app.note_list.iter().filter(|n| n.matches(query)) {
                            shown += 1;
                            ui.horizontal(|ui| {
                                let is_active = app.active_note.as_deref() == Some(note.id.as_str());
                                if ui.selectable_label(is_active, note.title.as_str()).clicked() {
                                    action = Some(ManagerAction::Open(note.id.clone()));
                                }
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    if ui.small_button("\u{1F5D1}").on_hover_text("Delete").clicked() {
                                        action = Some(ManagerAction::Delete(note.id.clone()));
                                    }
                                    if let Some(modified) = note.modified {
                                        ui.weak(format_age(modified, SystemTime::now()));
                                    }
                                });
                            });
                        }

                        if shown == 0 {
                            ui.weak(if query.is_empty() { "No notes yet" } else { "No matching notes" });
                        }
                    });
            });

        app.manager_visible = open;
        match action {
            Some(ManagerAction::Open(id)) => app.open_note(&id),
            Some(ManagerAction::Delete(id)) => app.delete_note(&id),
            Some(ManagerAction::Create) => app.new_note(),
            Some(ManagerAction::Refresh) => app.refresh_notes(),
            None => {}
        }
    }
}

/// Short human-readable age of a timestamp
fn format_age(modified: SystemTime, now: SystemTime) -> String {
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO).as_secs();
    match age {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", age / 60),
        3600..=86_399 => format!("{} h ago", age / 3600),
        _ => format!("{} d ago", age / 86_400),
    }
}
