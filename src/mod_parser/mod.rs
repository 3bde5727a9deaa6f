//! Turns a mod archive filename into a `(name, version)` pair.
//!
//! Pipeline:
//! 1. Normalize: drop brackets, the archive extension, loader tokens, the target
//!    platform version token and any leftover `+`.
//! 2. Split: pick the separator most likely to start the version.
//! 3. Classify: decide which side is the name.
//!
//! Filenames follow no schema, so the result is best-effort. A filename with no usable
//! boundary comes back with the version [`UNKNOWN_VERSION`].

use std::fmt;
use std::sync::LazyLock;
use regex::Regex;

use crate::config::{Config, ConfigError, TargetVersion};
use crate::version_token::TokenMatcher;

/// Version reported when no split point exists.
pub const UNKNOWN_VERSION: &str = "unknown";

static RE_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\]()]").expect("Invalid regex"));

/// The `(name, version)` identity of one mod archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMod {
    pub name: String,
    pub version: String,
}

impl ParsedMod {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Case-insensitive key used to match the same mod across directories.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn is_unknown(&self) -> bool {
        self.version == UNKNOWN_VERSION
    }
}

impl fmt::Display for ParsedMod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.version)
    }
}

/// A plausible name/version boundary in normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCandidate {
    /// Byte offset of the separator.
    pub index: usize,
    /// Number of digits after the separator.
    pub score: usize,
}

/// Filename parser bound to one target version and one set of loader tokens.
#[derive(Debug, Clone)]
pub struct ModParser {
    extension: String,
    loaders: Option<Regex>,
    target: TokenMatcher,
}

impl ModParser {
    /// Builds a parser for `target` using the extension and loader tokens in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Pattern` if the loader token pattern cannot be compiled.
    pub fn new(target: &TargetVersion, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            extension: config.archive_extension.clone(),
            loaders: loader_pattern(&config.loader_tokens)?,
            target: TokenMatcher::for_target(target),
        })
    }

    /// Steps 1-3 of normalization: brackets, extension and loader tokens.
    ///
    /// The stale-version purge works on this form, since it needs to see the target
    /// token before it is removed.
    pub fn clean(&self, filename: &str) -> String {
        let cleaned = RE_BRACKETS.replace_all(filename, "");
        let cleaned = strip_suffix_ci(&cleaned, &self.extension);
        match &self.loaders {
            Some(re) => re.replace_all(cleaned, "").into_owned(),
            None => cleaned.to_string(),
        }
    }

    /// Full normalization of a raw filename.
    ///
    /// # Arguments
    ///
    /// * `filename` - The archive file name as listed in a directory.
    ///
    /// # Returns
    ///
    /// The cleaned text with the target version token and every `+` removed. Never fails;
    /// text without anything to strip comes back unchanged.
    pub fn normalize(&self, filename: &str) -> String {
        let cleaned = self.clean(filename);
        self.target.strip_all(&cleaned).replace('+', "")
    }

    /// Parses a raw filename into its `(name, version)` pair.
    ///
    /// # Arguments
    ///
    /// * `filename` - The archive file name as listed in a directory.
    ///
    /// # Returns
    ///
    /// The best-effort `ParsedMod`. When the normalized text has no split point, the
    /// name is the whole normalized text and the version is [`UNKNOWN_VERSION`].
    pub fn parse(&self, filename: &str) -> ParsedMod {
        let normalized = self.normalize(filename);

        let Some(split) = find_split(&normalized) else {
            return ParsedMod::new(normalized, UNKNOWN_VERSION);
        };

        let (head, tail) = normalized.split_at(split);
        let (name, version) = classify(trim_part(head), trim_part(tail));
        ParsedMod::new(name, version)
    }

    /// The target token matcher this parser strips with.
    pub fn target_matcher(&self) -> &TokenMatcher {
        &self.target
    }
}

/// Parses `filename` for `target` with the default configuration.
///
/// # Errors
///
/// Returns `ConfigError::Pattern` if the default loader pattern cannot be compiled.
pub fn parse_filename(filename: &str, target: &TargetVersion) -> Result<ParsedMod, ConfigError> {
    Ok(ModParser::new(target, &Config::default())?.parse(filename))
}

/// Compiles the loader tokens into one case-insensitive alternation.
///
/// Tokens are tried in configured order and the first that matches wins, so with the
/// default list `neoforge` loses `neo` and leaves `forge` behind.
fn loader_pattern(tokens: &[String]) -> Result<Option<Regex>, regex::Error> {
    let tokens: Vec<&str> = tokens
        .iter()
        .map(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Ok(None);
    }

    let alternation = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).map(Some)
}

fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() || text.len() < suffix.len() {
        return text;
    }
    let cut = text.len() - suffix.len();
    if text.is_char_boundary(cut) && text[cut..].eq_ignore_ascii_case(suffix) {
        &text[..cut]
    } else {
        text
    }
}

fn trim_part(part: &str) -> &str {
    part.trim_matches(|c| c == '-' || c == '_' || c == ' ')
}

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Every plausible boundary in `text`, left to right.
///
/// A boundary is a `-`, `_` or `v` that follows a digit or precedes one, or a `-v` / `_v`
/// pair that precedes a digit. Candidates never overlap: a `-v` pair consumes its `v`.
pub fn split_candidates(text: &str) -> Vec<SplitCandidate> {
    let bytes = text.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let mut candidates = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let sep = bytes[pos];
        let consumed = if !matches!(sep, b'-' | b'_' | b'v') {
            0
        } else if (pos > 0 && digit_at(pos - 1)) || digit_at(pos + 1) {
            1
        } else if sep != b'v' && bytes.get(pos + 1) == Some(&b'v') && digit_at(pos + 2) {
            2
        } else {
            0
        };

        if consumed == 0 {
            pos += 1;
            continue;
        }

        candidates.push(SplitCandidate {
            index: pos,
            score: bytes[pos + 1..].iter().filter(|b| b.is_ascii_digit()).count(),
        });
        pos += consumed;
    }

    candidates
}

/// Picks the candidate with the most trailing digits; the earliest wins a tie.
pub fn best_split(candidates: &[SplitCandidate]) -> Option<usize> {
    candidates
        .iter()
        .copied()
        .reduce(|best, c| if c.score > best.score { c } else { best })
        .map(|c| c.index)
}

/// Byte offset of the most plausible name/version boundary in `text`.
///
/// # Arguments
///
/// * `text` - Normalized filename text.
///
/// # Returns
///
/// * `Some(index)` of the separator whose suffix holds the most digits.
/// * `None` if `text` has no candidate boundary.
pub fn find_split(text: &str) -> Option<usize> {
    best_split(&split_candidates(text))
}

/// Decides which half is the name.
///
/// The halves swap only when the first has digits and the second has none, which covers
/// filenames that lead with the version. This is a heuristic.
pub fn classify(part1: &str, part2: &str) -> (String, String) {
    if has_digit(part1) && !has_digit(part2) {
        (part2.to_string(), part1.to_string())
    } else {
        (part1.to_string(), part2.to_string())
    }
}
