//! Dictionary discovery
//!
//! Dictionaries come in MySpell/Hunspell pairs (`<locale>.aff` + `<locale>.dic`)
//! spread over a handful of well-known directories. The system directory list
//! is built once per process; a locator can also be given an explicit list.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::locale::Locale;

/// Environment variable naming an extra dictionary directory
pub const DICT_DIR_ENV: &str = "MYSPELL_DICT_DIR";

/// Subdirectory holding bundled dictionaries on Windows
#[cfg(target_os = "windows")]
const DICT_SUBDIR: &str = "dicts";

static SYSTEM_DIRS: OnceLock<Vec<PathBuf>> = OnceLock::new();

/// A located affix/dictionary pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryLocation {
    pub affix: PathBuf,
    pub dictionary: PathBuf,
}

/// Looks up dictionary pairs in an ordered list of directories
#[derive(Debug, Clone)]
pub struct DictionaryLocator {
    dirs: Vec<PathBuf>,
}

impl Default for DictionaryLocator {
    fn default() -> Self {
        Self::system()
    }
}

impl DictionaryLocator {
    /// Locator over the process-wide system directories
    pub fn system() -> Self {
        Self {
            dirs: system_dirs().to_vec(),
        }
    }

    /// Locator over an explicit list of directories, searched in order
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs: dedup(dirs) }
    }

    /// System directories with `extra` searched first
    pub fn with_extra_dir(extra: PathBuf) -> Self {
        let mut dirs = vec![extra];
        dirs.extend(system_dirs().iter().cloned());
        Self::with_dirs(dirs)
    }

    /// Directories searched, highest priority first
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find the first directory holding a readable pair for `language`
    pub fn scan_dict_paths(&self, language: &str) -> Option<DictionaryLocation> {
        for dir in &self.dirs {
            if !dir.is_dir() {
                continue;
            }
            let affix = dir.join(format!("{language}.aff"));
            let dictionary = dir.join(format!("{language}.dic"));
            if is_readable(&affix) && is_readable(&dictionary) {
                return Some(DictionaryLocation { affix, dictionary });
            }
        }

        tracing::debug!("No dictionary pair for {} in {:?}", language, self.dirs);
        None
    }

    /// Every locale with a complete dictionary pair, ordered by name
    pub fn supported_languages(&self) -> Vec<Locale> {
        let mut found = BTreeMap::new();

        for dir in &self.dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|ext| ext != "dic").unwrap_or(true) {
                    continue;
                }
                // the stem must be the canonical name so `scan_dict_paths` finds it again
                let Some(locale) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| Locale::parse(stem).filter(|locale| locale.name() == stem))
                else {
                    continue;
                };
                if is_readable(&path) && is_readable(&path.with_extension("aff")) {
                    found.entry(locale.name()).or_insert(locale);
                }
            }
        }

        found.into_values().collect()
    }
}

/// The memoized system directory list
pub fn system_dirs() -> &'static [PathBuf] {
    SYSTEM_DIRS.get_or_init(|| {
        let dirs = search_dirs(std::env::var_os(DICT_DIR_ENV), platform_dirs());
        tracing::debug!("Dictionary search path: {:?}", dirs);
        dirs
    })
}

/// Environment override first, then platform defaults, without duplicates
fn search_dirs(from_env: Option<OsString>, platform: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = from_env.filter(|dir| !dir.is_empty()) {
        dirs.push(PathBuf::from(dir));
    }
    dirs.extend(platform);
    dedup(dirs)
}

fn dedup(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(dirs.len());
    for dir in dirs {
        if !unique.contains(&dir) {
            unique.push(dir);
        }
    }
    unique
}

#[cfg(target_os = "windows")]
fn platform_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join(DICT_SUBDIR));
    }
    if let Some(data_dir) = crate::core::config::data_dir() {
        dirs.push(data_dir.join(DICT_SUBDIR));
    }
    dirs
}

#[cfg(target_os = "macos")]
fn platform_dirs() -> Vec<PathBuf> {
    // MacPorts
    vec![PathBuf::from("/opt/local/share/myspell")]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_dirs() -> Vec<PathBuf> {
    [
        "/usr/share/myspell",
        "/usr/share/hunspell",
        "/usr/local/share/myspell",
        "/usr/local/share/hunspell",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pair(dir: &Path, name: &str) {
        std::fs::write(dir.join(format!("{name}.aff")), "SET UTF-8\n").unwrap();
        std::fs::write(dir.join(format!("{name}.dic")), "1\nhello\n").unwrap();
    }

    #[test]
    fn test_env_dir_comes_first() {
        let dirs = search_dirs(
            Some(OsString::from("/opt/dicts")),
            vec![PathBuf::from("/usr/share/hunspell"), PathBuf::from("/opt/dicts")],
        );
        assert_eq!(
            dirs,
            vec![PathBuf::from("/opt/dicts"), PathBuf::from("/usr/share/hunspell")]
        );
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let dirs = search_dirs(Some(OsString::new()), vec![PathBuf::from("/a")]);
        assert_eq!(dirs, vec![PathBuf::from("/a")]);
    }

    #[test]
    fn test_scan_first_match_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_pair(first.path(), "en_US");
        write_pair(second.path(), "en_US");

        let locator = DictionaryLocator::with_dirs(vec![
            PathBuf::from("/nonexistent/dicts"),
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let location = locator.scan_dict_paths("en_US").unwrap();
        assert_eq!(location.dictionary, first.path().join("en_US.dic"));
        assert_eq!(location.affix, first.path().join("en_US.aff"));
    }

    #[test]
    fn test_scan_requires_both_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("de_DE.dic"), "1\nHallo\n").unwrap();

        let locator = DictionaryLocator::with_dirs(vec![dir.path().to_path_buf()]);
        assert!(locator.scan_dict_paths("de_DE").is_none());
        assert!(locator.scan_dict_paths("fr_FR").is_none());
    }

    #[test]
    fn test_supported_languages_dedup_and_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_pair(first.path(), "ru_RU");
        write_pair(first.path(), "en_US");
        write_pair(second.path(), "en_US");
        write_pair(second.path(), "hyph_en_US");
        std::fs::write(second.path().join("de_DE.dic"), "0\n").unwrap();

        let locator =
            DictionaryLocator::with_dirs(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let names: Vec<String> = locator
            .supported_languages()
            .iter()
            .map(Locale::name)
            .collect();
        assert_eq!(names, vec!["en_US".to_string(), "ru_RU".to_string()]);
    }

    #[test]
    fn test_listed_languages_can_be_found() {
        let dir = TempDir::new().unwrap();
        write_pair(dir.path(), "pt-BR");
        write_pair(dir.path(), "pt_PT");

        let locator = DictionaryLocator::with_dirs(vec![dir.path().to_path_buf()]);
        let listed = locator.supported_languages();
        assert_eq!(listed.iter().map(Locale::name).collect::<Vec<_>>(), vec!["pt_PT"]);
        for locale in &listed {
            assert!(locator.scan_dict_paths(&locale.name()).is_some());
        }
    }
}
