//! Note storage: one text file per note in a flat directory

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::note::{first_line, Note};

const NOTE_EXTENSION: &str = "txt";

/// Listing entry for the note manager
#[derive(Debug, Clone)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    pub text: String,
    pub modified: Option<SystemTime>,
}

impl NoteSummary {
    /// Case-insensitive match against title and body
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.text.to_lowercase().contains(&query)
    }
}

/// Directory of notes
#[derive(Debug, Clone)]
pub struct NoteStorage {
    dir: PathBuf,
}

impl NoteStorage {
    /// Open (and create if needed) a notes directory
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create notes directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn note_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{NOTE_EXTENSION}"))
    }

    /// All notes, most recently modified first
    pub fn list(&self) -> Result<Vec<NoteSummary>> {
        let mut notes = Vec::new();

        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to list {}", self.dir.display()))?;
            let path = entry.path();
            let is_note = entry.file_type().is_file()
                && path
                    .extension()
                    .map(|ext| ext == NOTE_EXTENSION)
                    .unwrap_or(false);
            if !is_note {
                continue;
            }

            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping unreadable note {}: {}", path.display(), e);
                    continue;
                }
            };
            notes.push(NoteSummary {
                id: path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default(),
                title: first_line(&text),
                text,
                modified: entry.metadata().ok().and_then(|m| m.modified().ok()),
            });
        }

        notes.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
        Ok(notes)
    }

    /// Create an empty note with a fresh ID
    pub fn create(&self) -> Result<Note> {
        let mut stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        while self.note_path(&stamp.to_string()).exists() {
            stamp += 1;
        }

        let id = stamp.to_string();
        let mut note = Note::new(id.clone(), self.note_path(&id));
        note.save()?;
        tracing::info!("Created note {}", id);
        Ok(note)
    }

    /// Load a note by ID
    pub fn load(&self, id: &str) -> Result<Note> {
        Note::open(&self.note_path(id))
    }

    /// Remove a note file
    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.note_path(id);
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete note: {}", path.display()))?;
        tracing::info!("Deleted note {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_list_delete() {
        let dir = TempDir::new().unwrap();
        let storage = NoteStorage::open(&dir.path().join("notes")).unwrap();

        let mut first = storage.create().unwrap();
        first.set_text("Groceries\nmilk".to_string());
        first.save().unwrap();
        let second = storage.create().unwrap();
        assert_ne!(first.id, second.id);

        std::fs::write(storage.dir().join("readme.md"), "not a note").unwrap();

        let notes = storage.list().unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().any(|n| n.title == "Groceries"));

        storage.delete(&second.id).unwrap();
        assert_eq!(storage.list().unwrap().len(), 1);
        assert!(storage.delete(&second.id).is_err());
    }

    #[test]
    fn test_load_by_id() {
        let dir = TempDir::new().unwrap();
        let storage = NoteStorage::open(dir.path()).unwrap();
        let mut note = storage.create().unwrap();
        note.set_text("Remember the milk".to_string());
        note.save().unwrap();

        let loaded = storage.load(&note.id).unwrap();
        assert_eq!(loaded.text, "Remember the milk");
    }

    #[test]
    fn test_summary_search() {
        let summary = NoteSummary {
            id: "1".to_string(),
            title: "Meeting".to_string(),
            text: "Meeting\nAsk about Budget".to_string(),
            modified: None,
        };
        assert!(summary.matches(""));
        assert!(summary.matches("budget"));
        assert!(summary.matches("MEET"));
        assert!(!summary.matches("holiday"));
    }
}
