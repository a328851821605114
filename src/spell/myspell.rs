//! Built-in engine for MySpell/Hunspell dictionaries
//!
//! Covers the subset of the format that plain word lookup needs: `SET`,
//! `FLAG`, `AF` aliases, `PFX`/`SFX` rules with conditions, cross products
//! and continuation classes (two suffixes), `TRY`, `REP`, `ICONV`, `BREAK`,
//! `FORBIDDENWORD`, `NEEDAFFIX`, `KEEPCASE` and `ONLYINCOMPOUND`.
//! Compounding and morphology are not supported; roots that only exist inside
//! compounds are rejected.
//!
//! Words are compared as bytes in the dictionary encoding. For UTF-8
//! dictionaries a "unit" is one character, otherwise one byte. Only case
//! folding goes through the dictionary codec.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::backend::{BackendLoader, SpellBackend};
use super::codec::TextCodec;
use super::error::{Result, SpellError};
use super::locator::DictionaryLocation;

/// Encoding assumed when the affix file has no `SET` line
const DEFAULT_ENCODING: &str = "ISO8859-1";

const MAX_SUGGESTIONS: usize = 15;

/// Nesting limit when splitting words at `BREAK` patterns
const MAX_BREAK_DEPTH: usize = 10;

/// `BREAK` patterns used when the affix file declares none
const DEFAULT_BREAKS: [&[u8]; 3] = [b"-", b"^-", b"-$"];

type Flag = u32;

/// Loads [`MySpell`] engines
#[derive(Debug, Default, Clone, Copy)]
pub struct MySpellLoader;

impl BackendLoader for MySpellLoader {
    fn load(&self, location: &DictionaryLocation) -> Result<Box<dyn SpellBackend>> {
        let engine = MySpell::open(&location.affix, &location.dictionary)?;
        Ok(Box::new(engine))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagMode {
    Char,
    Long,
    Num,
    Utf8,
}

impl FlagMode {
    fn parse(&self, raw: &[u8]) -> Vec<Flag> {
        match self {
            FlagMode::Char => raw.iter().map(|&b| Flag::from(b)).collect(),
            FlagMode::Long => raw
                .chunks(2)
                .map(|pair| pair.iter().fold(0, |acc, &b| (acc << 8) | Flag::from(b)))
                .collect(),
            FlagMode::Num => raw
                .split(|&b| b == b',')
                .filter_map(|n| std::str::from_utf8(n).ok()?.trim().parse().ok())
                .collect(),
            FlagMode::Utf8 => String::from_utf8_lossy(raw).chars().map(Flag::from).collect(),
        }
    }

    fn first(&self, raw: &[u8]) -> Option<Flag> {
        self.parse(raw).first().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CondElem {
    Any,
    Unit(Vec<u8>),
    Set { negated: bool, units: Vec<Vec<u8>> },
}

impl CondElem {
    fn matches(&self, unit: &[u8]) -> bool {
        match self {
            CondElem::Any => true,
            CondElem::Unit(expected) => expected == unit,
            CondElem::Set { negated, units } => units.iter().any(|u| u == unit) != *negated,
        }
    }
}

#[derive(Debug, Clone)]
struct AffixRule {
    flag: Flag,
    cross: bool,
    strip: Vec<u8>,
    add: Vec<u8>,
    condition: Vec<CondElem>,
    /// Flags after `/` in the affix: further affixes this one allows
    continuation: Vec<Flag>,
}

/// An in-memory MySpell dictionary
#[derive(Debug)]
pub struct MySpell {
    encoding: String,
    utf8: bool,
    codec: Option<TextCodec>,
    flag_mode: FlagMode,
    aliases: Vec<Vec<Flag>>,
    try_units: Vec<Vec<u8>>,
    replacements: Vec<(Vec<u8>, Vec<u8>)>,
    input_conv: Vec<(Vec<u8>, Vec<u8>)>,
    breaks: Vec<Vec<u8>>,
    prefixes: Vec<AffixRule>,
    suffixes: Vec<AffixRule>,
    /// Suffix flags that appear in some continuation class
    continued: HashSet<Flag>,
    forbidden: Option<Flag>,
    need_affix: Option<Flag>,
    keep_case: Option<Flag>,
    only_in_compound: Option<Flag>,
    words: HashMap<Vec<u8>, Vec<Flag>>,
}

impl MySpell {
    /// Read an affix/dictionary pair from disk
    pub fn open(affix: &Path, dictionary: &Path) -> Result<Self> {
        let aff = std::fs::read(affix).map_err(|e| SpellError::io(affix, e))?;
        let dic = std::fs::read(dictionary).map_err(|e| SpellError::io(dictionary, e))?;

        let mut engine = Self::from_affix(affix, &aff)?;
        engine.load_words(dictionary, &dic)?;
        tracing::debug!(
            "Loaded {} words from {} ({})",
            engine.words.len(),
            dictionary.display(),
            engine.encoding
        );
        Ok(engine)
    }

    fn from_affix(path: &Path, data: &[u8]) -> Result<Self> {
        let lines: Vec<Vec<&[u8]>> = data.split(|&b| b == b'\n').map(tokens).collect();

        // SET and FLAG decide how everything else is read
        let mut encoding = DEFAULT_ENCODING.to_string();
        let mut flag_mode = FlagMode::Char;
        for line in &lines {
            match line.as_slice() {
                [b"SET", name, ..] => encoding = String::from_utf8_lossy(name).into_owned(),
                [b"FLAG", kind, ..] => {
                    flag_mode = match kind.to_ascii_lowercase().as_slice() {
                        b"long" => FlagMode::Long,
                        b"num" => FlagMode::Num,
                        b"utf-8" => FlagMode::Utf8,
                        _ => FlagMode::Char,
                    }
                }
                _ => {}
            }
        }

        let mut engine = Self {
            utf8: encoding.eq_ignore_ascii_case("utf-8"),
            codec: TextCodec::for_dictionary(&encoding),
            encoding,
            flag_mode,
            aliases: Vec::new(),
            try_units: Vec::new(),
            replacements: Vec::new(),
            input_conv: Vec::new(),
            breaks: DEFAULT_BREAKS.iter().map(|p| p.to_vec()).collect(),
            prefixes: Vec::new(),
            suffixes: Vec::new(),
            continued: HashSet::new(),
            forbidden: None,
            need_affix: None,
            keep_case: None,
            only_in_compound: None,
            words: HashMap::new(),
        };

        let mut alias_header_seen = false;
        let mut rep_header_seen = false;
        let mut iconv_header_seen = false;
        let mut break_header_seen = false;
        // (is prefix, flag) -> (cross product allowed, entries still expected)
        let mut blocks: HashMap<(bool, Flag), (bool, usize)> = HashMap::new();

        for (idx, line) in lines.iter().enumerate() {
            let malformed = |reason: &str| SpellError::MalformedAffix {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: reason.to_string(),
            };

            match line.as_slice() {
                [b"TRY", chars, ..] => {
                    engine.try_units = engine.units(chars).into_iter().map(<[u8]>::to_vec).collect();
                }
                [b"FORBIDDENWORD", flag, ..] => engine.forbidden = flag_mode.first(flag),
                [b"NEEDAFFIX", flag, ..] => engine.need_affix = flag_mode.first(flag),
                [b"KEEPCASE", flag, ..] => engine.keep_case = flag_mode.first(flag),
                [b"ONLYINCOMPOUND", flag, ..] => engine.only_in_compound = flag_mode.first(flag),
                [b"ICONV", from, rest @ ..] => {
                    if !iconv_header_seen {
                        iconv_header_seen = true;
                    } else if let Some(to) = rest.first() {
                        engine.input_conv.push((from.to_vec(), unescape_rep(to)));
                    }
                }
                [b"BREAK", pattern, ..] => {
                    if !break_header_seen {
                        break_header_seen = true;
                        engine.breaks.clear();
                    } else {
                        engine.breaks.push(pattern.to_vec());
                    }
                }
                [b"AF", flags, ..] => {
                    if alias_header_seen {
                        engine.aliases.push(flag_mode.parse(flags));
                    } else {
                        alias_header_seen = true;
                    }
                }
                [b"REP", from, rest @ ..] => {
                    if !rep_header_seen {
                        rep_header_seen = true;
                    } else if let Some(to) = rest.first() {
                        engine.replacements.push((unescape_rep(from), unescape_rep(to)));
                    }
                }
                [kind @ (b"PFX" | b"SFX"), flag, rest @ ..] => {
                    let is_prefix = *kind == b"PFX";
                    let flag = flag_mode
                        .first(flag)
                        .ok_or_else(|| malformed("missing affix flag"))?;
                    let (cross, remaining) = blocks.get(&(is_prefix, flag)).copied().unwrap_or((false, 0));

                    if remaining == 0 {
                        let [cross, count, ..] = rest else {
                            return Err(malformed("short affix header"));
                        };
                        let count = std::str::from_utf8(count)
                            .ok()
                            .and_then(|c| c.parse::<usize>().ok())
                            .ok_or_else(|| malformed("affix count is not a number"))?;
                        blocks.insert((is_prefix, flag), (*cross == b"Y", count));
                        continue;
                    }

                    let [strip, add, tail @ ..] = rest else {
                        return Err(malformed("short affix entry"));
                    };
                    blocks.insert((is_prefix, flag), (cross, remaining - 1));

                    let mut parts = add.splitn(2, |&b| b == b'/');
                    let add = parts.next().unwrap_or_default();
                    let continuation = parts.next().map(|raw| engine.flags_of(raw)).unwrap_or_default();
                    engine.continued.extend(continuation.iter().copied());
                    let rule = AffixRule {
                        flag,
                        cross,
                        strip: zero_as_empty(strip),
                        add: zero_as_empty(add),
                        condition: engine.parse_condition(tail.first().copied().unwrap_or(b".")),
                        continuation,
                    };
                    if is_prefix {
                        engine.prefixes.push(rule);
                    } else {
                        engine.suffixes.push(rule);
                    }
                }
                _ => {}
            }
        }

        Ok(engine)
    }

    fn load_words(&mut self, path: &Path, data: &[u8]) -> Result<()> {
        let mut lines = data.split(|&b| b == b'\n').peekable();

        // optional approximate word count
        if let Some(first) = lines.peek() {
            let first = String::from_utf8_lossy(first);
            if first.trim().parse::<usize>().is_ok() {
                lines.next();
            }
        }

        for line in lines {
            let Some(entry) = tokens(line).into_iter().next() else {
                continue;
            };
            let (word, flags) = split_entry(entry);
            if word.is_empty() {
                return Err(SpellError::MalformedDictionary {
                    path: path.to_path_buf(),
                    reason: "entry without a word".to_string(),
                });
            }

            let flags = flags.map(|raw| self.flags_of(raw)).unwrap_or_default();
            self.words.entry(word).or_default().extend(flags);
        }

        Ok(())
    }

    /// Flags of a word or affix, resolving `AF` aliases
    fn flags_of(&self, raw: &[u8]) -> Vec<Flag> {
        if self.aliases.is_empty() {
            return self.flag_mode.parse(raw);
        }
        std::str::from_utf8(raw)
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| self.aliases.get(n.wrapping_sub(1)))
            .cloned()
            .unwrap_or_default()
    }

    fn parse_condition(&self, raw: &[u8]) -> Vec<CondElem> {
        if raw == b"." {
            return Vec::new();
        }

        let mut elems = Vec::new();
        let mut units = self.units(raw).into_iter();
        while let Some(unit) = units.next() {
            match unit {
                b"." => elems.push(CondElem::Any),
                b"[" => {
                    let mut negated = false;
                    let mut members = Vec::new();
                    for member in units.by_ref() {
                        match member {
                            b"]" => break,
                            b"^" if members.is_empty() && !negated => negated = true,
                            other => members.push(other.to_vec()),
                        }
                    }
                    elems.push(CondElem::Set {
                        negated,
                        units: members,
                    });
                }
                other => elems.push(CondElem::Unit(other.to_vec())),
            }
        }
        elems
    }

    /// Split a word into characters (UTF-8) or bytes (everything else)
    fn units<'a>(&self, word: &'a [u8]) -> Vec<&'a [u8]> {
        if self.utf8 {
            if let Ok(text) = std::str::from_utf8(word) {
                return text
                    .char_indices()
                    .map(|(i, c)| &word[i..i + c.len_utf8()])
                    .collect();
            }
        }
        word.chunks(1).collect()
    }

    fn flagged(flags: &[Flag], flag: Option<Flag>) -> bool {
        flag.is_some_and(|f| flags.contains(&f))
    }

    /// Whether a dictionary entry may back a checked word
    fn usable(&self, flags: &[Flag], case_changed: bool) -> bool {
        !Self::flagged(flags, self.forbidden)
            && !Self::flagged(flags, self.only_in_compound)
            && !(case_changed && Self::flagged(flags, self.keep_case))
    }

    fn has_flag(&self, root: &[u8], flag: Flag, case_changed: bool) -> bool {
        self.words
            .get(root)
            .is_some_and(|flags| flags.contains(&flag) && self.usable(flags, case_changed))
    }

    fn check_root(&self, word: &[u8], case_changed: bool) -> bool {
        self.words.get(word).is_some_and(|flags| {
            self.usable(flags, case_changed) && !Self::flagged(flags, self.need_affix)
        })
    }

    /// An affix that needs another affix, or only appears in compounds,
    /// cannot end a word on its own
    fn standalone(&self, rule: &AffixRule) -> bool {
        !Self::flagged(&rule.continuation, self.need_affix)
            && !Self::flagged(&rule.continuation, self.only_in_compound)
    }

    fn suffix_root(&self, rule: &AffixRule, word: &[u8]) -> Option<Vec<u8>> {
        if word.len() <= rule.add.len() || !word.ends_with(&rule.add) {
            return None;
        }
        let mut root = word[..word.len() - rule.add.len()].to_vec();
        root.extend_from_slice(&rule.strip);

        let units = self.units(&root);
        if units.len() < rule.condition.len() {
            return None;
        }
        let tail = &units[units.len() - rule.condition.len()..];
        rule.condition
            .iter()
            .zip(tail)
            .all(|(cond, unit)| cond.matches(unit))
            .then_some(root)
    }

    fn prefix_root(&self, rule: &AffixRule, word: &[u8]) -> Option<Vec<u8>> {
        if word.len() <= rule.add.len() || !word.starts_with(&rule.add) {
            return None;
        }
        let mut root = rule.strip.clone();
        root.extend_from_slice(&word[rule.add.len()..]);

        let units = self.units(&root);
        if units.len() < rule.condition.len() {
            return None;
        }
        rule.condition
            .iter()
            .zip(&units)
            .all(|(cond, unit)| cond.matches(unit))
            .then_some(root)
    }

    fn check_affixed(&self, word: &[u8], case_changed: bool) -> bool {
        let by_suffix = self.suffixes.iter().filter(|rule| self.standalone(rule)).any(|rule| {
            self.suffix_root(rule, word)
                .is_some_and(|root| self.has_flag(&root, rule.flag, case_changed))
        });
        if by_suffix || self.check_two_suffixes(word, case_changed) {
            return true;
        }

        self.prefixes.iter().filter(|rule| self.standalone(rule)).any(|prefix| {
            let Some(stem) = self.prefix_root(prefix, word) else {
                return false;
            };
            if self.has_flag(&stem, prefix.flag, case_changed) {
                return true;
            }
            prefix.cross
                && self
                    .suffixes
                    .iter()
                    .filter(|s| s.cross && self.standalone(s))
                    .any(|suffix| {
                        self.suffix_root(suffix, &stem).is_some_and(|root| {
                            self.has_flag(&root, suffix.flag, case_changed)
                                && self.has_flag(&root, prefix.flag, case_changed)
                        })
                    })
        })
    }

    /// root + inner suffix + outer suffix, where the inner suffix lists the
    /// outer one in its continuation class
    fn check_two_suffixes(&self, word: &[u8], case_changed: bool) -> bool {
        self.suffixes
            .iter()
            .filter(|outer| self.continued.contains(&outer.flag) && self.standalone(outer))
            .any(|outer| {
                let Some(stem) = self.suffix_root(outer, word) else {
                    return false;
                };
                self.suffixes
                    .iter()
                    .filter(|inner| {
                        inner.continuation.contains(&outer.flag)
                            && !Self::flagged(&inner.continuation, self.only_in_compound)
                    })
                    .any(|inner| {
                        self.suffix_root(inner, &stem)
                            .is_some_and(|root| self.has_flag(&root, inner.flag, case_changed))
                    })
            })
    }

    fn check(&self, word: &[u8], case_changed: bool) -> bool {
        self.check_root(word, case_changed) || self.check_affixed(word, case_changed)
    }

    /// The word itself, then its case variants
    fn spell_word(&self, word: &[u8]) -> bool {
        self.check(word, false)
            || self
                .case_variants(word)
                .iter()
                .any(|variant| self.check(variant, true))
    }

    /// Accept a word whose parts around a `BREAK` pattern are all correct
    fn spell_broken(&self, word: &[u8], depth: usize) -> bool {
        if depth >= MAX_BREAK_DEPTH {
            return false;
        }
        let part_ok = |part: &[u8]| {
            !part.is_empty() && (self.spell_word(part) || self.spell_broken(part, depth + 1))
        };

        self.breaks.iter().any(|pattern| {
            if let Some(lead) = pattern.strip_prefix(b"^") {
                return !lead.is_empty() && word.starts_with(lead) && part_ok(&word[lead.len()..]);
            }
            if let Some(trail) = pattern.strip_suffix(b"$") {
                return !trail.is_empty()
                    && word.ends_with(trail)
                    && part_ok(&word[..word.len() - trail.len()]);
            }
            let Some(pos) = find(word, pattern) else {
                return false;
            };
            pos > 0
                && pos + pattern.len() < word.len()
                && part_ok(&word[..pos])
                && part_ok(&word[pos + pattern.len()..])
        })
    }

    /// Apply `ICONV` pairs before lookup
    fn convert_input<'a>(&self, word: &'a [u8]) -> Cow<'a, [u8]> {
        if self.input_conv.is_empty() {
            return Cow::Borrowed(word);
        }
        let mut converted = word.to_vec();
        for (from, to) in &self.input_conv {
            converted = replace_all(&converted, from, to);
        }
        Cow::Owned(converted)
    }

    fn decode(&self, word: &[u8]) -> Option<String> {
        if self.utf8 {
            return std::str::from_utf8(word).ok().map(str::to_string);
        }
        self.codec.map(|codec| codec.decode(word))
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        match self.codec {
            Some(codec) if !self.utf8 => codec.encode(text).into_owned(),
            _ => text.as_bytes().to_vec(),
        }
    }

    /// Lowercase form, plus the title-case form for all-caps words
    fn case_variants(&self, word: &[u8]) -> Vec<Vec<u8>> {
        let (lower, title, all_caps) = match self.decode(word) {
            Some(text) => {
                let lower = text.to_lowercase();
                let mut chars = lower.chars();
                let title = match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                };
                let all_caps = !text.chars().any(char::is_lowercase);
                (self.encode(&lower), self.encode(&title), all_caps)
            }
            None => {
                let lower = word.to_ascii_lowercase();
                let mut title = lower.clone();
                if let Some(first) = title.first_mut() {
                    first.make_ascii_uppercase();
                }
                let all_caps = !word.iter().any(u8::is_ascii_lowercase);
                (lower, title, all_caps)
            }
        };

        let mut variants = Vec::new();
        if lower != word {
            variants.push(lower);
        }
        if all_caps && title != word && !variants.contains(&title) {
            variants.push(title);
        }
        variants
    }

    fn offer(&self, out: &mut Vec<Vec<u8>>, original: &[u8], candidate: Vec<u8>) {
        if out.len() < MAX_SUGGESTIONS
            && candidate != original
            && !out.contains(&candidate)
            && self.spell(&candidate)
        {
            out.push(candidate);
        }
    }
}

impl SpellBackend for MySpell {
    fn encoding(&self) -> &str {
        &self.encoding
    }

    fn spell(&self, word: &[u8]) -> bool {
        if word.is_empty() {
            return false;
        }
        let word = self.convert_input(word);
        self.spell_word(&word) || self.spell_broken(&word, 0)
    }

    fn suggest(&self, word: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        if word.is_empty() {
            return out;
        }

        for (from, to) in &self.replacements {
            let mut start = 0;
            while let Some(pos) = find(&word[start..], from).map(|p| p + start) {
                let mut candidate = word[..pos].to_vec();
                candidate.extend_from_slice(to);
                candidate.extend_from_slice(&word[pos + from.len()..]);
                self.offer(&mut out, word, candidate);
                start = pos + 1;
            }
        }

        let units = self.units(word);

        // swapped neighbours
        for i in 0..units.len().saturating_sub(1) {
            let mut swapped = units.clone();
            swapped.swap(i, i + 1);
            self.offer(&mut out, word, swapped.concat());
        }

        // one wrong character
        for i in 0..units.len() {
            for replacement in &self.try_units {
                let mut changed = units.clone();
                changed[i] = replacement.as_slice();
                self.offer(&mut out, word, changed.concat());
            }
        }

        // one extra character
        for i in 0..units.len() {
            let mut shorter = units.clone();
            shorter.remove(i);
            self.offer(&mut out, word, shorter.concat());
        }

        // one missing character
        for i in 0..=units.len() {
            for insertion in &self.try_units {
                let mut longer = units.clone();
                longer.insert(i, insertion.as_slice());
                self.offer(&mut out, word, longer.concat());
            }
        }

        // two words run together
        for i in 1..units.len() {
            if out.len() >= MAX_SUGGESTIONS {
                break;
            }
            let left = units[..i].concat();
            let right = units[i..].concat();
            if self.spell(&left) && self.spell(&right) {
                let mut pair = left;
                pair.push(b' ');
                pair.extend_from_slice(&right);
                if !out.contains(&pair) {
                    out.push(pair);
                }
            }
        }

        out
    }
}

/// Whitespace-separated tokens of one line, comments dropped
fn tokens(line: &[u8]) -> Vec<&[u8]> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.first() == Some(&b'#') {
        return Vec::new();
    }
    line.split(|b| b.is_ascii_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split `word/FLAGS` at the first unescaped slash
fn split_entry(entry: &[u8]) -> (Vec<u8>, Option<&[u8]>) {
    let mut word = Vec::with_capacity(entry.len());
    let mut i = 0;
    while i < entry.len() {
        match entry[i] {
            b'\\' if entry.get(i + 1) == Some(&b'/') => {
                word.push(b'/');
                i += 2;
            }
            b'/' => return (word, Some(&entry[i + 1..])),
            b => {
                word.push(b);
                i += 1;
            }
        }
    }
    (word, None)
}

fn zero_as_empty(raw: &[u8]) -> Vec<u8> {
    if raw == b"0" {
        Vec::new()
    } else {
        raw.to_vec()
    }
}

/// `REP` patterns write spaces as underscores
fn unescape_rep(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .map(|&b| if b == b'_' { b' ' } else { b })
        .collect()
}

fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = find(rest, from) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
