//! A single sticky note

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};

/// A plain-text note backed by one file
#[derive(Debug, Clone)]
pub struct Note {
    /// Note ID (file stem)
    pub id: String,
    /// File path
    pub path: PathBuf,
    /// Note text
    pub text: String,
    /// Whether the note has unsaved changes
    pub modified: bool,
    /// When the text last changed in the editor
    pub last_change: Option<Instant>,
    /// Last modification time on disk
    pub last_modified: Option<SystemTime>,
}

impl Note {
    /// Create a new empty note
    pub fn new(id: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id: id.into(),
            path,
            text: String::new(),
            modified: false,
            last_change: None,
            last_modified: None,
        }
    }

    /// Open a note from a file
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read note: {}", path.display()))?;

        let last_modified = fs::metadata(path)
            .ok()
            .and_then(|m| m.modified().ok());

        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            id,
            path: path.to_path_buf(),
            text,
            modified: false,
            last_change: None,
            last_modified,
        })
    }

    /// Save the note and clear the modified flag
    pub fn save(&mut self) -> Result<()> {
        fs::write(&self.path, &self.text)
            .with_context(|| format!("Failed to save note: {}", self.path.display()))?;
        tracing::info!("Saved note: {}", self.path.display());
        self.modified = false;
        self.last_modified = Some(SystemTime::now());
        Ok(())
    }

    /// Write the note text to a file outside the notes directory
    pub fn export(&self, target: &Path) -> Result<()> {
        fs::write(target, &self.text)
            .with_context(|| format!("Failed to export note to {}", target.display()))?;
        tracing::info!("Exported note {} to {}", self.id, target.display());
        Ok(())
    }

    /// Title: the first non-empty line
    pub fn title(&self) -> String {
        first_line(&self.text)
    }

    /// Mark the note as changed by the editor
    pub fn touch(&mut self) {
        self.modified = true;
        self.last_change = Some(Instant::now());
    }

    /// Update text and mark as modified
    pub fn set_text(&mut self, text: String) {
        if self.text != text {
            self.text = text;
            self.touch();
        }
    }

    /// Whether enough time passed since the last edit to save automatically
    pub fn needs_autosave(&self, interval: Duration, now: Instant) -> bool {
        if !self.modified || interval.is_zero() {
            return false;
        }
        self.last_change
            .map(|changed| now.duration_since(changed) >= interval)
            .unwrap_or(true)
    }
}

/// First non-empty line of `text`, or "Untitled"
pub fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Untitled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_title_is_first_non_empty_line() {
        let mut note = Note::new("1", PathBuf::from("1.txt"));
        assert_eq!(note.title(), "Untitled");
        note.set_text("\n   \n  Shopping list \n- milk".to_string());
        assert_eq!(note.title(), "Shopping list");
    }

    #[test]
    fn test_save_and_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("42.txt");
        let mut note = Note::new("42", path.clone());
        note.set_text("Call Bob".to_string());
        assert!(note.modified);
        note.save().unwrap();
        assert!(!note.modified);

        let reopened = Note::open(&path).unwrap();
        assert_eq!(reopened.id, "42");
        assert_eq!(reopened.text, "Call Bob");
    }

    #[test]
    fn test_needs_autosave() {
        let mut note = Note::new("1", PathBuf::from("1.txt"));
        let interval = Duration::from_secs(5);
        assert!(!note.needs_autosave(interval, Instant::now()));

        note.set_text("draft".to_string());
        let changed = note.last_change.unwrap();
        assert!(!note.needs_autosave(interval, changed + Duration::from_secs(1)));
        assert!(note.needs_autosave(interval, changed + Duration::from_secs(5)));
        assert!(!note.needs_autosave(Duration::ZERO, changed + Duration::from_secs(60)));
    }
}
