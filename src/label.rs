//! Label naming grammar
//!
//! A label starts with a letter or underscore and continues with letters,
//! digits or underscores. Any non-ASCII character counts as a letter, so
//! `_café` and `größe` are accepted while `1bad`, `-lower` and `a-b` are not.

use crate::error::{Result, TimerError};
use regex::Regex;
use std::sync::OnceLock;

const LABEL_PATTERN: &str = r"^[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*$";

fn label_regex() -> &'static Regex {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    LABEL_RE.get_or_init(|| Regex::new(LABEL_PATTERN).expect("label pattern is a valid regex"))
}

/// Check whether `label` satisfies the naming grammar
pub fn is_valid_label(label: &str) -> bool {
    label_regex().is_match(label)
}

/// Validate `label`, failing with [`TimerError::InvalidLabel`]
pub fn validate_label(label: &str) -> Result<()> {
    if is_valid_label(label) {
        Ok(())
    } else {
        Err(TimerError::InvalidLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_labels_accepted() {
        for label in ["lower", "_private", "strtolower", "A", "_", "x1_y2", "__call"] {
            assert!(is_valid_label(label), "expected `{}` to be valid", label);
        }
    }

    #[test]
    fn test_extended_letters_accepted() {
        assert!(is_valid_label("café"));
        assert!(is_valid_label("größe"));
        assert!(is_valid_label("ñ1"));
        assert!(is_valid_label("関数"));
    }

    #[test]
    fn test_invalid_labels_rejected() {
        for label in ["", "1bad", "-strtolower", "a-b", "with space", "a.b", "x::y", "tab\t"] {
            assert!(!is_valid_label(label), "expected `{}` to be invalid", label);
        }
    }

    #[test]
    fn test_validate_label_error() {
        match validate_label("9lives") {
            Err(TimerError::InvalidLabel(label)) => assert_eq!(label, "9lives"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(validate_label("nine_lives").is_ok());
    }
}
