//! Locale identifiers used to key dictionaries

use std::fmt;
use std::str::FromStr;

/// Language plus optional country, e.g. `en_US` or `eo`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Create a locale from already validated parts
    pub fn new(language: impl Into<String>, country: Option<&str>) -> Self {
        Self {
            language: language.into(),
            country: country.map(str::to_string),
        }
    }

    /// Parse `ll`, `ll_CC` or `ll-CC`. Returns `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        let (language, country) = match name.find(['_', '-']) {
            Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
            None => (name, None),
        };

        let language_ok = (2..=3).contains(&language.len())
            && language.bytes().all(|b| b.is_ascii_lowercase());
        if !language_ok {
            return None;
        }

        if let Some(country) = country {
            let alpha = country.len() == 2 && country.bytes().all(|b| b.is_ascii_uppercase());
            let numeric = country.len() == 3 && country.bytes().all(|b| b.is_ascii_digit());
            if !alpha && !numeric {
                return None;
            }
        }

        Some(Self::new(language, country))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Canonical name, also the dictionary file stem
    pub fn name(&self) -> String {
        match &self.country {
            Some(country) => format!("{}_{}", self.language, country),
            None => self.language.clone(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not a locale name: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_and_country() {
        let locale = Locale::parse("en_US").unwrap();
        assert_eq!(locale.language(), "en");
        assert_eq!(locale.country(), Some("US"));
        assert_eq!(locale.name(), "en_US");

        let dashed = Locale::parse("pt-BR").unwrap();
        assert_eq!(dashed.name(), "pt_BR");
    }

    #[test]
    fn test_parse_language_only() {
        let locale = Locale::parse("eo").unwrap();
        assert_eq!(locale.country(), None);
        assert_eq!(locale.to_string(), "eo");
    }

    #[test]
    fn test_parse_rejects_non_locales() {
        assert!(Locale::parse("C").is_none());
        assert!(Locale::parse("hyph_en_US").is_none());
        assert!(Locale::parse("en_us").is_none());
        assert!(Locale::parse("EN").is_none());
        assert!(Locale::parse("").is_none());
        assert!(Locale::parse("es_419").is_some());
    }
}
