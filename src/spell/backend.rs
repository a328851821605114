//! Seam between the spell checker and the engine doing the lookups

use super::error::Result;
use super::locator::DictionaryLocation;

/// One loaded dictionary. Works on words in the dictionary's own encoding.
pub trait SpellBackend {
    /// Encoding name as declared by the dictionary (e.g. `ISO8859-1`)
    fn encoding(&self) -> &str;

    /// Whether the encoded word is correctly spelled
    fn spell(&self, word: &[u8]) -> bool;

    /// Replacement candidates for the encoded word, best first
    fn suggest(&self, word: &[u8]) -> Vec<Vec<u8>>;
}

/// Opens engines for located dictionary pairs
pub trait BackendLoader {
    fn load(&self, location: &DictionaryLocation) -> Result<Box<dyn SpellBackend>>;
}
