//! Whitespace tokenization of raw report text
//!
//! Reports are sequences of space-delimited groups. TAFs are commonly
//! transmitted across several lines; line breaks are ordinary whitespace.

/// Split raw report text into ordered, non-empty groups
///
/// Never fails; empty or blank input yields an empty sequence.
pub fn tokenize(raw: &str) -> Vec<&str> {
    raw.split_whitespace().collect()
}

/// Strip the trailing `=` end-of-message marker some feeds append
pub fn strip_terminator(token: &str) -> &str {
    token.strip_suffix('=').unwrap_or(token)
}

/// Tokenize and drop end-of-message markers, discarding groups that become empty
pub fn tokenize_report(raw: &str) -> Vec<&str> {
    raw.split_whitespace()
        .map(strip_terminator)
        .filter(|token| !token.is_empty())
        .collect()
}
