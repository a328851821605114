//! Note editor panel with spell checking

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use eframe::egui;
use egui::text::{LayoutJob, TextFormat};
use egui::text_selection::CCursorRange;

use crate::app::StickyNoteApp;
use crate::spell::words::word_at;

/// Suggestions listed in the context menu
const MAX_MENU_SUGGESTIONS: usize = 8;

/// Change requested from the context menu
enum MenuAction {
    Replace(Range<usize>, String),
    AddWord(String),
}

/// Misspelled ranges of the last text the layouter saw
#[derive(Debug, Default)]
pub struct MisspellingCache {
    key: Option<(u64, u64)>,
    ranges: Vec<Range<usize>>,
}

impl MisspellingCache {
    /// Ranges for `text`, rechecked only when the text or the checker's
    /// revision changed
    pub fn ranges(
        &mut self,
        text: &str,
        revision: u64,
        check: impl FnOnce(&str) -> Vec<Range<usize>>,
    ) -> &[Range<usize>] {
        let key = (text_hash(text), revision);
        if self.key != Some(key) {
            self.ranges = check(text);
            self.key = Some(key);
        }
        &self.ranges
    }
}

/// Note editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut StickyNoteApp) {
        ui.vertical(|ui| {
            if app.notes.len() > 1 {
                Self::show_tabs(ui, app);
                ui.separator();
            }

            let Some(id) = app.active_note.clone() else {
                Self::show_welcome(ui);
                return;
            };

            egui::ScrollArea::vertical()
                .id_salt("editor_scroll")
                .show(ui, |ui| Self::show_note(ui, app, &id));
        });
    }

    fn show_note(ui: &mut egui::Ui, app: &mut StickyNoteApp, id: &str) {
        let spellcheck = app.config.editor.spellcheck;
        let font_size = app.config.editor.font_size;
        let focus = std::mem::take(&mut app.focus_editor);
        let StickyNoteApp {
            notes,
            spell,
            spell_cache,
            ..
        } = app;
        let Some(note) = notes.get_mut(id) else {
            return;
        };

        let revision = spell.revision();
        let mut layouter = |ui: &egui::Ui, buf: &dyn egui::TextBuffer, wrap_width: f32| {
            let text = buf.as_str();
            let misspelled: &[Range<usize>] = if spellcheck {
                spell_cache.ranges(text, revision, |t| spell.misspelled(t))
            } else {
                &[]
            };
            let mut job = highlight_job(text, misspelled, font_size, ui.visuals().text_color());
            job.wrap.max_width = wrap_width;
            ui.fonts(|f| f.layout_job(job))
        };

        let output = egui::TextEdit::multiline(&mut note.text)
            .desired_width(f32::INFINITY)
            .desired_rows(20)
            .lock_focus(true)
            .layouter(&mut layouter)
            .show(ui);

        if output.response.changed() {
            note.touch();
        }
        if focus {
            output.response.request_focus();
        }
        if !spellcheck {
            return;
        }

        // A right click moves the text cursor to the clicked word first
        let mut clicked = None;
        if output.response.secondary_clicked() {
            if let Some(pointer) = output.response.interact_pointer_pos() {
                let cursor = output.galley.cursor_from_pos(pointer - output.galley_pos);
                let mut state = output.state.clone();
                state.cursor.set_char_range(Some(CCursorRange::one(cursor)));
                state.store(ui.ctx(), output.response.id);
                clicked = Some(cursor.index);
            }
        }

        let target = clicked
            .or(output.cursor_range.map(|range| range.primary.index))
            .and_then(|index| misspelled_word_at(&note.text, index, |word| spell.spell(word)));

        let mut action = None;
        output.response.context_menu(|ui| match &target {
            Some(range) => {
                let word = &note.text[range.clone()];
                let suggestions = spell.suggestions(word);
                if suggestions.is_empty() {
                    ui.weak("No suggestions");
                }
                for suggestion in suggestions.into_iter().take(MAX_MENU_SUGGESTIONS) {
                    if ui.button(suggestion.as_str()).clicked() {
                        action = Some(MenuAction::Replace(range.clone(), suggestion));
                        ui.close();
                    }
                }
                ui.separator();
                if ui.button(format!("Add \"{}\" to dictionary", word)).clicked() {
                    action = Some(MenuAction::AddWord(word.to_string()));
                    ui.close();
                }
            }
            None => {
                ui.weak("No misspelled word at cursor");
            }
        });

        match action {
            Some(MenuAction::Replace(range, replacement)) => {
                note.text.replace_range(range, &replacement);
                note.touch();
            }
            Some(MenuAction::AddWord(word)) => {
                spell.add_to_dictionary(&word);
                spell.save_custom_words();
            }
            None => {}
        }
    }

    /// Show tabs for the open notes
    fn show_tabs(ui: &mut egui::Ui, app: &mut StickyNoteApp) {
        let mut ids: Vec<_> = app.notes.keys().cloned().collect();
        ids.sort();

        let mut close = None;
        ui.horizontal_wrapped(|ui| {
            for id in ids {
                let Some(note) = app.notes.get(&id) else {
                    continue;
                };
                let title = if note.modified {
                    format!("{}*", note.title())
                } else {
                    note.title()
                };

                let is_active = app.active_note.as_deref() == Some(id.as_str());
                let response = ui.selectable_label(is_active, title);
                if response.clicked() {
                    app.active_note = Some(id.clone());
                }
                if response.middle_clicked() {
                    close = Some(id);
                }
            }
        });

        if let Some(id) = close {
            app.close_note(&id);
        }
    }

    /// Show welcome screen when no note is open
    fn show_welcome(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading("Stickynote");
            ui.add_space(20.0);

            ui.label("Create a note or open one from the note manager.");
            ui.add_space(10.0);

            ui.label("Keyboard shortcuts:");
            ui.label("  Ctrl+N - New note");
            ui.label("  Ctrl+S - Save");
            ui.label("  Ctrl+M - Note manager");
        });
    }
}

/// Build a layout job that underlines the given byte ranges
fn highlight_job(
    text: &str,
    misspelled: &[Range<usize>],
    font_size: f32,
    color: egui::Color32,
) -> LayoutJob {
    let normal = TextFormat {
        font_id: egui::FontId::proportional(font_size),
        color,
        ..Default::default()
    };
    let flagged = TextFormat {
        underline: egui::Stroke::new(1.5, egui::Color32::RED),
        ..normal.clone()
    };

    let mut job = LayoutJob::default();
    let mut pos = 0;
    for range in misspelled {
        if range.start > pos {
            job.append(&text[pos..range.start], 0.0, normal.clone());
        }
        job.append(&text[range.clone()], 0.0, flagged.clone());
        pos = range.end;
    }
    if pos < text.len() || text.is_empty() {
        job.append(&text[pos..], 0.0, normal);
    }
    job
}

/// The misspelled word containing the character at `char_index`
fn misspelled_word_at(
    text: &str,
    char_index: usize,
    is_correct: impl Fn(&str) -> bool,
) -> Option<Range<usize>> {
    word_at(text, char_to_byte(text, char_index)).filter(|range| !is_correct(&text[range.clone()]))
}

fn text_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Convert a character index into a byte offset
fn char_to_byte(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte() {
        assert_eq!(char_to_byte("naïve word", 3), 4);
        assert_eq!(char_to_byte("abc", 10), 3);
        assert_eq!(char_to_byte("", 0), 0);
    }

    #[test]
    fn test_misspelled_word_at_clicked_char() {
        let text = "Grüße aus Bërlin";
        let is_correct = |word: &str| word != "Bërlin";

        // 'l' in "Bërlin" is char 13 but byte 16
        assert_eq!(misspelled_word_at(text, 13, is_correct), Some(12..19));
        assert_eq!(misspelled_word_at(text, 1, is_correct), None);
        assert_eq!(misspelled_word_at(text, 5, is_correct), None);
    }

    #[test]
    fn test_cache_rechecks_on_change_only() {
        let mut cache = MisspellingCache::default();
        let mut checks = 0;
        let mut check = |_: &str| {
            checks += 1;
            vec![0..3]
        };

        assert_eq!(cache.ranges("teh cat", 0, &mut check), &[0..3]);
        cache.ranges("teh cat", 0, &mut check);
        cache.ranges("teh cats", 0, &mut check);
        cache.ranges("teh cats", 1, &mut check);
        assert_eq!(checks, 3);
    }

    #[test]
    fn test_highlight_job_sections() {
        let text = "a speling eror here";
        let job = highlight_job(text, &[2..9, 10..14], 14.0, egui::Color32::WHITE);

        let underlined: Vec<_> = job
            .sections
            .iter()
            .filter(|s| s.format.underline.width > 0.0)
            .map(|s| &text[s.byte_range.clone()])
            .collect();
        assert_eq!(underlined, vec!["speling", "eror"]);
        assert_eq!(job.text, text);
    }

    #[test]
    fn test_highlight_job_plain_text() {
        let job = highlight_job("fine", &[], 14.0, egui::Color32::WHITE);
        assert_eq!(job.sections.len(), 1);
        assert_eq!(job.text, "fine");
    }
}
