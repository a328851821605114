//! Conversion between dictionary byte encodings and Rust strings

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Bidirectional mapping for one dictionary's native encoding
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl TextCodec {
    /// Resolve a codec from the encoding name a dictionary declares
    pub fn for_dictionary(declared: &str) -> Option<Self> {
        let name = normalize_encoding_name(declared);
        Encoding::for_label(name.trim().as_bytes()).map(|encoding| Self { encoding })
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encode for the engine. Unmappable characters become numeric
    /// character references, which no dictionary word matches.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, _) = self.encoding.encode(text);
        bytes
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _) = self.encoding.decode_without_bom_handling(bytes);
        text.into_owned()
    }
}

/// Rewrite vendor spellings that encoding tables do not know
pub fn normalize_encoding_name(declared: &str) -> Cow<'_, str> {
    let lower = declared.to_ascii_lowercase();
    if let Some(page) = lower.strip_prefix("microsoft-cp125") {
        return Cow::Owned(format!("Windows-125{page}"));
    }
    if lower.starts_with("tis620-2533") {
        return Cow::Borrowed("TIS-620");
    }
    Cow::Borrowed(declared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_vendor_names() {
        assert_eq!(normalize_encoding_name("microsoft-cp1251"), "Windows-1251");
        assert_eq!(normalize_encoding_name("TIS620-2533"), "TIS-620");
        assert_eq!(normalize_encoding_name("ISO8859-1"), "ISO8859-1");
    }

    #[test]
    fn test_resolves_hunspell_names() {
        assert!(TextCodec::for_dictionary("UTF-8").is_some());
        assert!(TextCodec::for_dictionary("ISO8859-15").is_some());
        assert!(TextCodec::for_dictionary("KOI8-R").is_some());
        assert_eq!(
            TextCodec::for_dictionary("microsoft-cp1251").unwrap().name(),
            "windows-1251"
        );
        assert_eq!(
            TextCodec::for_dictionary("TIS620-2533").unwrap().name(),
            "windows-874"
        );
        assert!(TextCodec::for_dictionary("ISCII-DEVANAGARI").is_none());
    }

    #[test]
    fn test_round_trip_through_single_byte_encoding() {
        let codec = TextCodec::for_dictionary("microsoft-cp1251").unwrap();
        let bytes = codec.encode("привет");
        assert_eq!(bytes.len(), 6);
        assert_eq!(codec.decode(&bytes), "привет");
    }
}
