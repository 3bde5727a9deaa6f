use std::cmp::Ordering;

/// One piece of a tokenized version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionToken<'a> {
    /// A maximal run of ASCII digits.
    Number(&'a str),
    /// Text between digit runs, possibly empty at either end.
    Text(&'a str),
}

impl<'a> VersionToken<'a> {
    fn as_str(&self) -> &'a str {
        match *self {
            VersionToken::Number(s) | VersionToken::Text(s) => s,
        }
    }
}

/// Splits a version on digit runs, keeping the separators.
///
/// # Arguments
///
/// * `version` - The version string to split.
///
/// # Returns
///
/// Tokens borrowing from `version`. The result always alternates `Text`, `Number`,
/// `Text`, ... and starts and ends with `Text`, so `"1.2"` becomes `["", 1, ".", 2, ""]`.
pub fn tokenize(version: &str) -> Vec<VersionToken<'_>> {
    let mut tokens = Vec::new();
    let mut rest = version;

    loop {
        let text_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        tokens.push(VersionToken::Text(&rest[..text_len]));
        rest = &rest[text_len..];
        if rest.is_empty() {
            break;
        }

        let digit_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        tokens.push(VersionToken::Number(&rest[..digit_len]));
        rest = &rest[digit_len..];
    }

    tokens
}

/// Compares two digit runs by value, without overflowing on long runs.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_tokens(a: &VersionToken<'_>, b: &VersionToken<'_>) -> Ordering {
    match (a, b) {
        (VersionToken::Number(x), VersionToken::Number(y)) => compare_numeric(x, y),
        // Mixed kinds fall back to plain string order.
        _ => a.as_str().cmp(b.as_str()),
    }
}

/// Orders two version strings by their tokens.
///
/// Digit runs compare numerically (`"1.2.0" < "1.10.0"`), everything else compares as
/// text. A sequence that is a prefix of the other sorts first.
///
/// # Arguments
///
/// * `v1` - The left-hand version.
/// * `v2` - The right-hand version.
///
/// # Returns
///
/// `Ordering::Greater` if `v1` sorts after `v2`, `Ordering::Less` if before, and
/// `Ordering::Equal` if both tokenize identically.
pub fn compare_versions(v1: &str, v2: &str) -> Ordering {
    let left = tokenize(v1);
    let right = tokenize(v2);

    left.iter()
        .zip(right.iter())
        .map(|(a, b)| compare_tokens(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| left.len().cmp(&right.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_alternating_text_and_numbers() {
        assert_eq!(
            tokenize("1.2-beta3"),
            vec![
                VersionToken::Text(""),
                VersionToken::Number("1"),
                VersionToken::Text("."),
                VersionToken::Number("2"),
                VersionToken::Text("-beta"),
                VersionToken::Number("3"),
                VersionToken::Text(""),
            ]
        );
        assert_eq!(tokenize(""), vec![VersionToken::Text("")]);
        assert_eq!(tokenize("unknown"), vec![VersionToken::Text("unknown")]);
    }

    #[test]
    fn compares_numbers_numerically() {
        assert_eq!(compare_versions("1.2.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare_versions("1.10.0", "1.2.0"), Ordering::Greater);
        assert_eq!(compare_versions("2.0", "1.0"), Ordering::Greater);
    }

    #[test]
    fn equal_versions_compare_equal() {
        assert_eq!(compare_versions("3.2.1", "3.2.1"), Ordering::Equal);
        assert_eq!(compare_versions("", ""), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_do_not_change_value() {
        assert_eq!(compare_versions("1.02", "1.2"), Ordering::Equal);
    }

    #[test]
    fn huge_digit_runs_do_not_overflow() {
        assert_eq!(
            compare_versions("1.99999999999999999999999", "1.100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn longer_sequence_wins_when_prefix_is_equal() {
        assert_eq!(compare_versions("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("1.0.1", "1.0"), Ordering::Greater);
    }

    #[test]
    fn separators_compare_as_text() {
        // "-" (0x2d) sorts before "." (0x2e).
        assert_eq!(compare_versions("1-2", "1.2"), Ordering::Less);
        assert_eq!(compare_versions("1.0-beta", "1.0-alpha"), Ordering::Greater);
    }

    #[test]
    fn mixed_token_kinds_compare_as_text() {
        let number = VersionToken::Number("10");
        let text = VersionToken::Text("a");
        assert_eq!(compare_tokens(&number, &text), Ordering::Less);
        assert_eq!(compare_tokens(&text, &number), Ordering::Greater);
    }

    #[test]
    fn trailing_text_after_equal_numbers() {
        // "1.0" tokenizes to [.., 0, ""] and "1.0a" to [.., 0, "a"].
        assert_eq!(compare_versions("1.0", "1.0a"), Ordering::Less);
    }
}
