//! Splitting editor text into checkable words

use std::ops::Range;

/// Byte ranges of the words in `text`.
///
/// A word is a run of letters, optionally joined by single apostrophes or
/// hyphens (`don't`, `well-known`). Runs touching digits or underscores are
/// skipped, as are single letters.
pub fn word_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_alphanumeric() && c != '_' {
            continue;
        }

        let mut end = start + c.len_utf8();
        let mut letters = usize::from(c.is_alphabetic());
        let mut skip = !c.is_alphabetic();

        while let Some(&(idx, next)) = chars.peek() {
            if next.is_alphabetic() {
                letters += 1;
                end = idx + next.len_utf8();
                chars.next();
            } else if next.is_numeric() || next == '_' {
                skip = true;
                end = idx + next.len_utf8();
                chars.next();
            } else if is_joiner(next) && text[idx + next.len_utf8()..].starts_with(char::is_alphabetic) {
                end = idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        if !skip && letters > 1 {
            ranges.push(start..end);
        }
    }

    ranges
}

/// The word containing byte offset `pos`, if any
pub fn word_at(text: &str, pos: usize) -> Option<Range<usize>> {
    word_ranges(text)
        .into_iter()
        .find(|range| range.start <= pos && pos <= range.end)
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        word_ranges(text).into_iter().map(|r| &text[r]).collect()
    }

    #[test]
    fn test_basic_words() {
        assert_eq!(words("Hello, world!"), vec!["Hello", "world"]);
        assert_eq!(words("don't stop"), vec!["don't", "stop"]);
        assert_eq!(words("a well-known fact"), vec!["well-known", "fact"]);
    }

    #[test]
    fn test_skips_numbers_and_identifiers() {
        assert_eq!(words("abc123 x1 snake_case 2024 ok"), vec!["ok"]);
        assert_eq!(words("trailing- 'quoted'"), vec!["trailing", "quoted"]);
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(words("Grüße из Москвы"), vec!["Grüße", "из", "Москвы"]);
    }

    #[test]
    fn test_word_at() {
        let text = "one two three";
        assert_eq!(word_at(text, 5), Some(4..7));
        assert_eq!(word_at(text, 7), Some(4..7));
        assert_eq!(word_at("  ", 1), None);
    }
}
