//! Spell checking over every loaded language

use std::ops::Range;
use std::path::PathBuf;

use super::backend::{BackendLoader, SpellBackend};
use super::codec::TextCodec;
use super::custom_dict::CustomDictionary;
use super::error::{Result, SpellError};
use super::locale::Locale;
use super::locator::DictionaryLocator;
use super::myspell::MySpellLoader;
use super::words::word_ranges;

/// Description of a loaded dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictInfo {
    pub language: String,
    pub country: Option<String>,
    pub filename: PathBuf,
}

struct LanguageEntry {
    locale: Locale,
    filename: PathBuf,
    codec: TextCodec,
    backend: Box<dyn SpellBackend>,
}

/// Checks words against the custom dictionary and every loaded language.
///
/// Not meant to be shared between threads: the UI thread owns it.
pub struct SpellChecker {
    locator: DictionaryLocator,
    loader: Box<dyn BackendLoader>,
    custom: CustomDictionary,
    languages: Vec<LanguageEntry>,
    /// Bumped whenever a check result may change
    revision: u64,
}

impl SpellChecker {
    /// Checker using the built-in MySpell engine
    pub fn new(locator: DictionaryLocator, custom: CustomDictionary) -> Self {
        Self::with_loader(locator, custom, Box::new(MySpellLoader))
    }

    /// Checker using a different engine
    pub fn with_loader(
        locator: DictionaryLocator,
        custom: CustomDictionary,
        loader: Box<dyn BackendLoader>,
    ) -> Self {
        Self {
            locator,
            loader,
            custom,
            languages: Vec::new(),
            revision: 0,
        }
    }

    /// Locales with installed dictionaries
    pub fn supported_languages(&self) -> Vec<Locale> {
        self.locator.supported_languages()
    }

    /// Load the dictionary for `locale`. Returns `false` when no dictionary
    /// is installed, it cannot be read, or its encoding is unknown.
    /// Loading an already loaded locale is a no-op returning `true`.
    pub fn add_language(&mut self, locale: &Locale) -> bool {
        if self.languages.iter().any(|entry| &entry.locale == locale) {
            tracing::debug!("Dictionary for {} is already loaded", locale);
            return true;
        }

        match self.open_language(locale) {
            Ok(Some(entry)) => {
                tracing::info!(
                    "Loaded {} dictionary {} ({})",
                    locale,
                    entry.filename.display(),
                    entry.codec.name()
                );
                self.languages.push(entry);
                self.revision += 1;
                true
            }
            Ok(None) => {
                tracing::debug!("No dictionary installed for {}", locale);
                false
            }
            Err(e) => {
                tracing::warn!("Failed to load dictionary for {}: {}", locale, e);
                false
            }
        }
    }

    fn open_language(&self, locale: &Locale) -> Result<Option<LanguageEntry>> {
        let Some(location) = self.locator.scan_dict_paths(&locale.name()) else {
            return Ok(None);
        };

        let backend = self.loader.load(&location)?;
        let codec = TextCodec::for_dictionary(backend.encoding())
            .ok_or_else(|| SpellError::UnsupportedEncoding(backend.encoding().to_string()))?;

        Ok(Some(LanguageEntry {
            locale: locale.clone(),
            filename: location.dictionary,
            codec,
            backend,
        }))
    }

    /// Whether `word` is in the custom dictionary or any loaded language
    pub fn spell(&self, word: &str) -> bool {
        if self.custom.contains(word) {
            return true;
        }
        self.languages
            .iter()
            .any(|entry| entry.backend.spell(&entry.codec.encode(word)))
    }

    /// Suggestions from every language, in load order
    pub fn suggestions(&self, word: &str) -> Vec<String> {
        self.languages
            .iter()
            .flat_map(|entry| {
                entry
                    .backend
                    .suggest(&entry.codec.encode(word))
                    .into_iter()
                    .map(|raw| entry.codec.decode(&raw))
            })
            .collect()
    }

    pub fn add_to_dictionary(&mut self, word: &str) {
        self.custom.insert(word);
        self.revision += 1;
    }

    /// Changes after a language or custom word is added
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn loaded_dicts(&self) -> Vec<DictInfo> {
        self.languages
            .iter()
            .map(|entry| DictInfo {
                language: entry.locale.language().to_string(),
                country: entry.locale.country().map(str::to_string),
                filename: entry.filename.clone(),
            })
            .collect()
    }

    /// Byte ranges of misspelled words in `text`
    pub fn misspelled(&self, text: &str) -> Vec<Range<usize>> {
        if self.languages.is_empty() {
            return Vec::new();
        }
        word_ranges(text)
            .into_iter()
            .filter(|range| !self.spell(&text[range.clone()]))
            .collect()
    }

    /// Words the user added at runtime
    pub fn custom_words(&self) -> &CustomDictionary {
        &self.custom
    }

    /// Directories searched for dictionaries, highest priority first
    pub fn search_dirs(&self) -> &[PathBuf] {
        self.locator.dirs()
    }

    /// Persist the custom dictionary now instead of waiting for drop
    pub fn save_custom_words(&mut self) {
        if let Err(e) = self.custom.save() {
            tracing::warn!("Failed to write runtime spellcheck dictionary: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::error::SpellError;
    use crate::spell::locator::DictionaryLocation;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_dict(dir: &Path, name: &str, aff: &[u8], dic: &[u8]) {
        std::fs::write(dir.join(format!("{name}.aff")), aff).unwrap();
        std::fs::write(dir.join(format!("{name}.dic")), dic).unwrap();
    }

    fn checker_in(dir: &Path) -> SpellChecker {
        SpellChecker::new(
            DictionaryLocator::with_dirs(vec![dir.to_path_buf()]),
            CustomDictionary::in_memory(),
        )
    }

    fn locale(name: &str) -> Locale {
        Locale::parse(name).unwrap()
    }

    #[test]
    fn test_custom_words_without_languages() {
        let dir = TempDir::new().unwrap();
        let mut checker = checker_in(dir.path());
        assert!(!checker.spell("qtnotefoo"));
        checker.add_to_dictionary("qtnotefoo");
        assert!(checker.spell("qtnotefoo"));
        assert!(checker.loaded_dicts().is_empty());
    }

    #[test]
    fn test_add_language_reports_dict_info() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\nTRY lo\n", b"2\nhello\nworld\n");
        let mut checker = checker_in(dir.path());

        assert!(checker.add_language(&locale("en_US")));
        assert_eq!(
            checker.loaded_dicts(),
            vec![DictInfo {
                language: "en".to_string(),
                country: Some("US".to_string()),
                filename: dir.path().join("en_US.dic"),
            }]
        );
        assert!(checker.spell("hello"));
        assert!(!checker.spell("helo"));
        assert_eq!(checker.suggestions("helo"), vec!["hello".to_string()]);
    }

    #[test]
    fn test_revision_tracks_changes() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\n", b"1\nhello\n");
        let mut checker = checker_in(dir.path());
        let start = checker.revision();

        assert!(!checker.add_language(&locale("fr_FR")));
        assert_eq!(checker.revision(), start);
        checker.add_language(&locale("en_US"));
        checker.add_to_dictionary("stickynote");
        assert_eq!(checker.revision(), start + 2);
    }

    #[test]
    fn test_missing_dictionary_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut checker = checker_in(dir.path());
        assert!(!checker.add_language(&locale("fr_FR")));
        assert!(checker.loaded_dicts().is_empty());
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "hi_IN", b"SET ISCII-DEVANAGARI\n", b"1\nnamaste\n");
        let mut checker = checker_in(dir.path());
        assert!(!checker.add_language(&locale("hi_IN")));
        assert!(checker.loaded_dicts().is_empty());
    }

    #[test]
    fn test_languages_keep_load_order_and_no_duplicates() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\n", b"1\ncolor\n");
        write_dict(dir.path(), "en_GB", b"SET UTF-8\n", b"1\ncolour\n");
        write_dict(dir.path(), "de_DE", b"SET UTF-8\n", b"1\nFarbe\n");
        let mut checker = checker_in(dir.path());

        assert!(checker.add_language(&locale("en_GB")));
        assert!(checker.add_language(&locale("de_DE")));
        assert!(checker.add_language(&locale("en_US")));
        assert!(checker.add_language(&locale("en_GB")));

        let order: Vec<_> = checker
            .loaded_dicts()
            .into_iter()
            .map(|info| format!("{}_{}", info.language, info.country.unwrap()))
            .collect();
        assert_eq!(order, vec!["en_GB", "de_DE", "en_US"]);
        assert!(checker.spell("color") && checker.spell("colour") && checker.spell("Farbe"));
    }

    #[test]
    fn test_non_utf8_dictionary_through_codec() {
        let dir = TempDir::new().unwrap();
        // "кот" and "кит" in windows-1251
        write_dict(
            dir.path(),
            "ru_RU",
            b"SET microsoft-cp1251\nTRY \xee\xe8\n",
            b"2\n\xea\xee\xf2\n\xea\xe8\xf2\n",
        );
        let mut checker = checker_in(dir.path());

        assert!(checker.add_language(&locale("ru_RU")));
        assert!(checker.spell("кот"));
        assert!(checker.spell("Кот"));
        assert!(checker.spell("КОТ"));
        assert!(!checker.spell("кат"));
        let suggestions = checker.suggestions("кат");
        assert!(suggestions.contains(&"кот".to_string()));
        assert!(suggestions.contains(&"кит".to_string()));
    }

    #[test]
    fn test_latin1_dictionary_folds_non_ascii_case() {
        let dir = TempDir::new().unwrap();
        // "über" in ISO-8859-1
        write_dict(dir.path(), "de_DE", b"SET ISO8859-1\n", b"1\n\xfcber\n");
        let mut checker = checker_in(dir.path());

        assert!(checker.add_language(&locale("de_DE")));
        assert!(checker.spell("über"));
        assert!(checker.spell("Über"));
        assert!(checker.spell("ÜBER"));
        assert!(!checker.spell("uber"));
    }

    #[test]
    fn test_hyphenated_compounds() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\n", b"2\nwell\nknown\n");
        let mut checker = checker_in(dir.path());
        checker.add_language(&locale("en_US"));

        assert!(checker.spell("well-known"));
        assert!(checker.spell("Well-known"));
        assert!(!checker.spell("well-knwon"));
        assert!(checker.misspelled("a well-known fact").iter().all(|r| r.start != 2));

        let text = "well-knwon";
        assert_eq!(checker.misspelled(text), vec![0..text.len()]);
    }

    #[test]
    fn test_suggestions_concatenate_languages() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\nTRY a\n", b"1\ncat\n");
        write_dict(dir.path(), "en_GB", b"SET UTF-8\nTRY a\n", b"1\ncat\n");
        let mut checker = checker_in(dir.path());
        checker.add_language(&locale("en_US"));
        checker.add_language(&locale("en_GB"));

        assert_eq!(checker.suggestions("ct"), vec!["cat".to_string(), "cat".to_string()]);
    }

    #[test]
    fn test_misspelled_ranges() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\n", b"3\nthe\ncat\nsat\n");
        let mut checker = checker_in(dir.path());
        assert!(checker.misspelled("teh cat").is_empty());

        checker.add_language(&locale("en_US"));
        checker.add_to_dictionary("purred");
        let text = "The cat sta and purred";
        let ranges = checker.misspelled(text);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&text[ranges[0].clone()], "sta");
        assert_eq!(&text[ranges[1].clone()], "and");
    }

    #[test]
    fn test_custom_words_survive_restart() {
        let dicts = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let words_path = data.path().join("spellcheck-custom.words");

        {
            let mut checker = SpellChecker::new(
                DictionaryLocator::with_dirs(vec![dicts.path().to_path_buf()]),
                CustomDictionary::load(&words_path),
            );
            checker.add_to_dictionary("qtnotefoo");
            checker.add_to_dictionary("egui");
        }

        let checker = SpellChecker::new(
            DictionaryLocator::with_dirs(vec![dicts.path().to_path_buf()]),
            CustomDictionary::load(&words_path),
        );
        assert!(checker.spell("qtnotefoo"));
        assert!(checker.spell("egui"));
    }

    struct FailingLoader;

    impl BackendLoader for FailingLoader {
        fn load(&self, location: &DictionaryLocation) -> crate::spell::error::Result<Box<dyn SpellBackend>> {
            Err(SpellError::MalformedDictionary {
                path: location.dictionary.clone(),
                reason: "test".to_string(),
            })
        }
    }

    #[test]
    fn test_engine_failure_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_dict(dir.path(), "en_US", b"SET UTF-8\n", b"1\nhello\n");
        let mut checker = SpellChecker::with_loader(
            DictionaryLocator::with_dirs(vec![dir.path().to_path_buf()]),
            CustomDictionary::in_memory(),
            Box::new(FailingLoader),
        );
        assert!(!checker.add_language(&locale("en_US")));
    }
}
