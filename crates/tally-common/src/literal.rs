//! Lexical classification of numeric literals.
//!
//! A word is numeric when every character is an ASCII digit or `.`. The
//! check is deliberately permissive: `1.2.3` and even `.` classify as
//! floating-point, and integer words are accepted regardless of magnitude.
//! Stricter validation would change which programs type-check, so it is not
//! done here.

use serde::Serialize;

/// The lexical form of a numeric literal, which decides its base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberForm {
    /// Digits only.
    Integer,
    /// Digits and at least one `.`.
    Float,
}

/// Classify `word` as a numeric literal, or `None` if it is not one.
pub fn classify_number(word: &str) -> Option<NumberForm> {
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if word.contains('.') {
        Some(NumberForm::Float)
    } else {
        Some(NumberForm::Integer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_integer() {
        assert_eq!(classify_number("0"), Some(NumberForm::Integer));
        assert_eq!(
            classify_number("123456789012345678901234567890"),
            Some(NumberForm::Integer)
        );
    }

    #[test]
    fn dotted_words_are_float() {
        assert_eq!(classify_number("30.0"), Some(NumberForm::Float));
        assert_eq!(classify_number(".5"), Some(NumberForm::Float));
        assert_eq!(classify_number("5."), Some(NumberForm::Float));
    }

    #[test]
    fn multiple_dots_still_float() {
        assert_eq!(classify_number("1.2.3"), Some(NumberForm::Float));
        assert_eq!(classify_number("."), Some(NumberForm::Float));
    }

    #[test]
    fn other_words_are_not_numbers() {
        assert_eq!(classify_number(""), None);
        assert_eq!(classify_number("1e5"), None);
        assert_eq!(classify_number("x"), None);
        assert_eq!(classify_number("-1"), None);
    }
}
