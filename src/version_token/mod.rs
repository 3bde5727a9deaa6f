//! Matching of platform-version tokens (such as `mc1.21.1` or `1.20.1-1.21`) inside
//! mod filenames.
//!
//! A token is found from one of two contexts: directly after a digit, or at the start of
//! the text / after one of `-`, `_`, `+`. The grammar after the context is
//!
//! ```text
//! [marker] [range prefix] literal [patch suffix]   followed by end of text or - _ . +
//! ```
//!
//! where `marker` is `mc_`, `mc-`, `mc` or `+`. Each optional piece is tried longest first
//! and the first combination whose trailing context holds wins. All literal matching is
//! ASCII case-insensitive.

use crate::config::TargetVersion;

/// Loader markers tried in order before the version literal.
const MARKERS: [&str; 4] = ["mc_", "mc", "mc-", "+"];

/// What may follow the version literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchSuffix {
    /// Nothing.
    None,
    /// Optionally `.N` (digits 1-9), `.X` or `x`.
    Optional,
    /// Exactly one `.N` with a single digit 1-9.
    SingleDigit,
}

/// One version literal together with its range prefix and suffix rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformToken {
    literal: String,
    range_prefix: Option<String>,
    suffix: PatchSuffix,
}

impl PlatformToken {
    pub fn new(literal: &str, range_prefix: Option<String>, suffix: PatchSuffix) -> Self {
        Self {
            literal: literal.to_string(),
            range_prefix,
            suffix,
        }
    }

    /// The token for the current target: `1.21`, optionally preceded by `1.20.N-` and
    /// followed by a patch suffix.
    pub fn for_target(target: &TargetVersion) -> Self {
        Self::new(&target.to_string(), target.previous(), PatchSuffix::Optional)
    }

    /// A historical entry such as `1.12.x` (one patch digit) or `1.7.10` (literal).
    pub fn historical(entry: &str) -> Self {
        let entry = entry.trim();
        let lower = entry.to_ascii_lowercase();
        match lower.strip_suffix(".x") {
            Some(literal) => Self::new(literal, None, PatchSuffix::SingleDigit),
            None => Self::new(entry, None, PatchSuffix::None),
        }
    }

    /// End offsets of the range prefix starting at `at`, longest first.
    fn range_lengths(&self, text: &[u8], at: usize) -> Vec<usize> {
        let mut lengths = Vec::with_capacity(2);
        if let Some(prev) = &self.range_prefix {
            let dot = at + prev.len();
            if starts_with_ci(text, at, prev.as_bytes())
                && text.get(dot) == Some(&b'.')
                && text.get(dot + 1).is_some_and(|b| (b'1'..=b'9').contains(b))
                && text.get(dot + 2) == Some(&b'-')
            {
                lengths.push(prev.len() + 3);
            }
        }
        lengths.push(0);
        lengths
    }

    /// Suffix lengths starting at `at`, in the order a backtracking matcher would try them.
    fn suffix_lengths(&self, text: &[u8], at: usize) -> Vec<usize> {
        let digit_run = text
            .get(at + 1..)
            .unwrap_or_default()
            .iter()
            .take_while(|b| (b'1'..=b'9').contains(*b))
            .count();
        let dot = text.get(at) == Some(&b'.');

        match self.suffix {
            PatchSuffix::None => vec![0],
            PatchSuffix::SingleDigit if dot && digit_run > 0 => vec![2],
            PatchSuffix::SingleDigit => Vec::new(),
            PatchSuffix::Optional => {
                let mut lengths = Vec::new();
                if dot {
                    lengths.extend((1..=digit_run).rev().map(|n| n + 1));
                    if text.get(at + 1).is_some_and(|b| b.eq_ignore_ascii_case(&b'x')) {
                        lengths.push(2);
                    }
                }
                if text.get(at).is_some_and(|b| b.eq_ignore_ascii_case(&b'x')) {
                    lengths.push(1);
                }
                lengths.push(0);
                lengths
            }
        }
    }
}

/// A set of tokens tried in order at every position of a text.
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    tokens: Vec<PlatformToken>,
}

impl TokenMatcher {
    pub fn new(tokens: Vec<PlatformToken>) -> Self {
        Self { tokens }
    }

    /// Matcher for the target version alone.
    pub fn for_target(target: &TargetVersion) -> Self {
        Self::new(vec![PlatformToken::for_target(target)])
    }

    /// Matcher for a list of historical entries, see [`PlatformToken::historical`].
    pub fn historical<S: AsRef<str>>(entries: &[S]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|e| PlatformToken::historical(e.as_ref()))
                .filter(|t| !t.literal.is_empty())
                .collect(),
        )
    }

    /// Byte span of the first token occurrence in `text`.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        let bytes = text.as_bytes();
        (0..bytes.len()).find_map(|pos| self.match_at(bytes, pos))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Removes every non-overlapping token occurrence, scanning left to right.
    pub fn strip_all(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            match self.match_at(bytes, pos) {
                Some((start, end)) => {
                    out.push_str(&text[copied..start]);
                    copied = end;
                    pos = end;
                }
                None => pos += 1,
            }
        }

        out.push_str(&text[copied..]);
        out
    }

    /// Tries the after-digit context first, then the start/separator context.
    fn match_at(&self, text: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos > 0 && text[pos - 1].is_ascii_digit() {
            if let Some(end) = self.body_end(text, pos) {
                return Some((pos, end));
            }
        }

        if pos == 0 {
            if let Some(end) = self.body_end(text, pos) {
                return Some((pos, end));
            }
        }

        if matches!(text.get(pos), Some(b'-' | b'_' | b'+')) {
            if let Some(end) = self.body_end(text, pos + 1) {
                return Some((pos, end));
            }
        }

        None
    }

    fn body_end(&self, text: &[u8], at: usize) -> Option<usize> {
        let markers = MARKERS
            .iter()
            .filter(|m| starts_with_ci(text, at, m.as_bytes()))
            .map(|m| m.len())
            .chain(std::iter::once(0));

        for marker in markers {
            for token in &self.tokens {
                let after_marker = at + marker;
                for range in token.range_lengths(text, after_marker) {
                    let literal_at = after_marker + range;
                    if !starts_with_ci(text, literal_at, token.literal.as_bytes()) {
                        continue;
                    }
                    let literal_end = literal_at + token.literal.len();
                    for suffix in token.suffix_lengths(text, literal_end) {
                        let end = literal_end + suffix;
                        if at_token_boundary(text, end) {
                            return Some(end);
                        }
                    }
                }
            }
        }

        None
    }
}

fn starts_with_ci(text: &[u8], at: usize, needle: &[u8]) -> bool {
    text.get(at..at + needle.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(needle))
}

fn at_token_boundary(text: &[u8], end: usize) -> bool {
    matches!(text.get(end), None | Some(b'-' | b'_' | b'.' | b'+'))
}
