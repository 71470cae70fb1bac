//! Tests for report tokenization

use super::super::tokenizer::{strip_terminator, tokenize, tokenize_report};

#[test]
fn test_tokenize_splits_on_any_whitespace() {
    let tokens = tokenize("KJFK 051730Z\n  0518/0624\t33015KT");
    assert_eq!(tokens, vec!["KJFK", "051730Z", "0518/0624", "33015KT"]);
}

#[test]
fn test_tokenize_empty_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \n\t ").is_empty());
}

#[test]
fn test_strip_terminator() {
    assert_eq!(strip_terminator("A3008="), "A3008");
    assert_eq!(strip_terminator("A3008"), "A3008");
    assert_eq!(strip_terminator("="), "");
}

#[test]
fn test_tokenize_report_drops_lone_terminators() {
    let tokens = tokenize_report("KATL 052253Z 12008KT A3008 =");
    assert_eq!(tokens, vec!["KATL", "052253Z", "12008KT", "A3008"]);
}
