//! User-added words, kept across sessions
//!
//! The file is a plain sequence of records: a big-endian `u32` byte length
//! followed by the UTF-8 word. Loaded once on construction and written back
//! when the dictionary is dropped.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::error::{Result, SpellError};

/// File name inside the user data directory
pub const CUSTOM_WORDS_FILE: &str = "spellcheck-custom.words";

/// Longest record accepted on load; anything larger means a corrupt file
const MAX_WORD_BYTES: u32 = 1024;

/// Set of words the user added to the dictionary
#[derive(Debug, Default)]
pub struct CustomDictionary {
    path: Option<PathBuf>,
    words: BTreeSet<String>,
    dirty: bool,
}

impl CustomDictionary {
    /// Dictionary that is never persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load words from `path`. A missing or unreadable file gives an empty set.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut words = BTreeSet::new();

        match File::open(&path) {
            Ok(file) => {
                if let Err(e) = read_words(BufReader::new(file), &mut words) {
                    tracing::warn!(
                        "Custom dictionary {} is damaged, kept {} words: {}",
                        path.display(),
                        words.len(),
                        e
                    );
                }
            }
            Err(e) => {
                tracing::debug!("No custom dictionary at {}: {}", path.display(), e);
            }
        }

        Self {
            path: Some(path),
            words,
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Add a word; adding an existing word changes nothing
    pub fn insert(&mut self, word: &str) {
        if self.words.insert(word.to_string()) {
            self.dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Write every word back to the file, replacing its contents
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SpellError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| SpellError::io(path, e))?;
        let mut out = BufWriter::new(file);
        write_words(&mut out, &self.words)
            .and_then(|_| out.flush())
            .map_err(|e| SpellError::io(path, e))?;

        self.dirty = false;
        tracing::debug!("Saved {} custom words to {}", self.words.len(), path.display());
        Ok(())
    }
}

impl Drop for CustomDictionary {
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        if let Err(e) = self.save() {
            tracing::warn!("Failed to write runtime spellcheck dictionary: {}", e);
        }
    }
}

fn read_words(mut input: impl Read, words: &mut BTreeSet<String>) -> io::Result<()> {
    loop {
        let len = match input.read_u32::<BigEndian>() {
            Ok(len) => len,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        };
        if len > MAX_WORD_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("record of {len} bytes"),
            ));
        }

        let mut buf = vec![0u8; len as usize];
        input.read_exact(&mut buf)?;
        let word = String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        words.insert(word);
    }
}

fn write_words<'a>(
    out: &mut impl Write,
    words: impl IntoIterator<Item = &'a String>,
) -> io::Result<()> {
    for word in words {
        out.write_u32::<BigEndian>(word.len() as u32)?;
        out.write_all(word.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let dict = CustomDictionary::load(dir.path().join(CUSTOM_WORDS_FILE));
        assert!(dict.is_empty());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut dict = CustomDictionary::in_memory();
        dict.insert("qtnotefoo");
        dict.insert("qtnotefoo");
        assert_eq!(dict.len(), 1);
        assert!(dict.contains("qtnotefoo"));
    }

    #[test]
    fn test_saved_on_drop_and_reloaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CUSTOM_WORDS_FILE);

        {
            let mut dict = CustomDictionary::load(&path);
            dict.insert("Grüße");
            dict.insert("rustacean");
        }

        let dict = CustomDictionary::load(&path);
        assert_eq!(dict.words().collect::<Vec<_>>(), vec!["Grüße", "rustacean"]);
    }

    #[test]
    fn test_record_layout() {
        let mut buf = Vec::new();
        let words = vec!["ab".to_string()];
        write_words(&mut buf, &words).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    fn test_truncated_file_keeps_complete_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CUSTOM_WORDS_FILE);
        let mut data = vec![0, 0, 0, 3];
        data.extend_from_slice(b"foo");
        data.extend_from_slice(&[0, 0, 0, 9, b'b']);
        std::fs::write(&path, data).unwrap();

        let dict = CustomDictionary::load(&path);
        assert_eq!(dict.len(), 1);
        assert!(dict.contains("foo"));
    }

    #[test]
    fn test_unwritable_path_is_swallowed_on_drop() {
        let dir = TempDir::new().unwrap();
        // a directory where the file should be
        let path = dir.path().join(CUSTOM_WORDS_FILE);
        std::fs::create_dir(&path).unwrap();

        let mut dict = CustomDictionary::load(&path);
        dict.insert("lost");
        assert!(dict.save().is_err());
        drop(dict);
        assert!(path.is_dir());
    }
}
