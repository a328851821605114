//! Spell checking: dictionary discovery, engines, custom words

pub mod backend;
pub mod checker;
pub mod codec;
pub mod custom_dict;
pub mod error;
pub mod locale;
pub mod locator;
pub mod myspell;
pub mod words;

pub use checker::SpellChecker;
pub use custom_dict::CustomDictionary;
pub use locale::Locale;
pub use locator::DictionaryLocator;
