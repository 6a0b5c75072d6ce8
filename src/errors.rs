//! Error types for puzzle parsing, with error codes and helpful messages.
//!
//! # Error Codes
//!
//! Each variant has a unique code (E001-E010) for documentation lookup:
//!
//! - E001: `ForbiddenOperator` (Operator other than `+` / `=`)
//! - E002: `MissingSymbol` (No `=` or no `+` in the statement)
//! - E003: `MultipleEquals` (More than one `=`)
//! - E004: `EmptyStatement` (Empty puzzle line)
//! - E005: `EmptyWord` (A summand with no letters)
//! - E006: `InvalidCharacter` (Non-letter inside a word)
//! - E007: `WordTooLong` (Word longer than `MAX_WORD_LEN`)
//! - E008: `TooManyLetters` (More than ten distinct letters)
//! - E009: `NomError` (Low-level nom parser error)
//! - E010: `CoefficientOverflow` (Positional weights of one letter exceed 64 bits)
//!
//! # Examples
//!
//! ```
//! use cryptarithm::errors::ParseError;
//! use cryptarithm::parser::Puzzle;
//!
//! match "CAT + DOG".parse::<Puzzle>() {
//!     Err(e) => {
//!         assert_eq!(e.code(), "E002");
//!         println!("{}", e.display_detailed());
//!     }
//!     Ok(_) => unreachable!(),
//! }
//! # let _ = ParseError::EmptyStatement;
//! ```

use crate::side::Side;
use nom::error::{ErrorKind, ParseError as NomParseError};

/// Custom error type for puzzle parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Only the addition `+` operator is allowed, found '{op}'")]
    ForbiddenOperator { op: char },

    #[error("Missing '{symbol}' in puzzle statement")]
    MissingSymbol { symbol: char },

    #[error("Expected exactly one '=', found {count}")]
    MultipleEquals { count: usize },

    #[error("Empty puzzle statement")]
    EmptyStatement,

    #[error("Empty word on the {side}")]
    EmptyWord { side: Side },

    #[error("Word \"{word}\" contains invalid character '{invalid_char}' (only letters A-Z allowed)")]
    InvalidCharacter { word: String, invalid_char: char },

    #[error("Word \"{word}\" is longer than {max} letters")]
    WordTooLong { word: String, max: usize },

    #[error("Puzzle uses {count} distinct letters but there are only 10 digits")]
    TooManyLetters { count: usize },

    // nom parser error (lowest level)
    #[error("nom parser error: {0:?}")]
    NomError(ErrorKind),

    #[error("Coefficient of letter '{letter}' does not fit in a 64-bit integer")]
    CoefficientOverflow { letter: char },
}

impl<'a> NomParseError<&'a str> for Box<ParseError> {
    fn from_error_kind(_input: &'a str, kind: ErrorKind) -> Self {
        Box::new(ParseError::NomError(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::ForbiddenOperator { .. } => "E001",
            ParseError::MissingSymbol { .. } => "E002",
            ParseError::MultipleEquals { .. } => "E003",
            ParseError::EmptyStatement => "E004",
            ParseError::EmptyWord { .. } => "E005",
            ParseError::InvalidCharacter { .. } => "E006",
            ParseError::WordTooLong { .. } => "E007",
            ParseError::TooManyLetters { .. } => "E008",
            ParseError::NomError(_) => "E009",
            ParseError::CoefficientOverflow { .. } => "E010",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ParseError::ForbiddenOperator { .. } => "Forbidden operator",
            ParseError::MissingSymbol { .. } => "Missing `=` or `+`",
            ParseError::MultipleEquals { .. } => "More than one `=`",
            ParseError::EmptyStatement => "Empty puzzle statement",
            ParseError::EmptyWord { .. } => "Empty word",
            ParseError::InvalidCharacter { .. } => "Invalid character in word",
            ParseError::WordTooLong { .. } => "Word too long",
            ParseError::TooManyLetters { .. } => "Too many distinct letters",
            ParseError::NomError(_) => "Low-level parser error",
            ParseError::CoefficientOverflow { .. } => "Coefficient overflow",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            ParseError::ForbiddenOperator { .. } => "Puzzles are sums: the operators `*`, `-`, `^` and `%` are rejected anywhere in the line.",
            ParseError::MissingSymbol { .. } => "A puzzle needs at least two summands joined by `+` on the left and a single `=` before the result.",
            ParseError::MultipleEquals { .. } => "Chained equalities such as `A + B = C = D` are not supported.",
            ParseError::EmptyStatement => "The first line of the puzzle file is empty, or the file has no lines.",
            ParseError::EmptyWord { .. } => "Two operators appear with no word between them, or an operator is at the start or end of a side.",
            ParseError::InvalidCharacter { .. } => "Words may only contain ASCII letters; digits and punctuation are rejected.",
            ParseError::WordTooLong { .. } => "Positional weights are 64-bit integers, which bounds the length of a single word.",
            ParseError::TooManyLetters { .. } => "Distinct letters must take distinct decimal digits, so a puzzle can use at most ten letters.",
            ParseError::NomError(_) => "The tokenizer failed without a more specific error. This usually means the line has an unexpected shape.",
            ParseError::CoefficientOverflow { .. } => "Each letter's coefficient sums `10^p` over all of its occurrences. Many long words repeating one letter can push that sum past the 64-bit range.",
        }
    }

    /// Returns a helpful suggestion or example for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::ForbiddenOperator { .. } => Some("Rewrite the puzzle as a sum, e.g. 'SEND + MORE = MONEY'"),
            ParseError::MissingSymbol { .. } => Some("Expected format: WORD + WORD = WORD"),
            ParseError::MultipleEquals { .. } => Some("Keep a single '=' between the summands and the result"),
            ParseError::EmptyStatement => Some("Put the puzzle on the first line of the file, e.g. 'SEND + MORE = MONEY'"),
            ParseError::EmptyWord { .. } => Some("Remove the stray '+' or add the missing word"),
            ParseError::InvalidCharacter { .. } => Some("Use letters only; each letter stands for one digit"),
            ParseError::TooManyLetters { .. } => Some("Use a puzzle with at most ten distinct letters"),
            ParseError::CoefficientOverflow { .. } => Some("Use fewer or shorter words for the repeated letter"),
            _ => None,
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(base_msg: &str, code: &str, help: Option<&str>) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<ParseError> {
        vec![
            ParseError::ForbiddenOperator { op: '*' },
            ParseError::MissingSymbol { symbol: '=' },
            ParseError::MultipleEquals { count: 2 },
            ParseError::EmptyStatement,
            ParseError::EmptyWord { side: Side::Left },
            ParseError::InvalidCharacter { word: "A1".to_string(), invalid_char: '1' },
            ParseError::WordTooLong { word: "A".repeat(20), max: 18 },
            ParseError::TooManyLetters { count: 11 },
            ParseError::NomError(ErrorKind::Tag),
            ParseError::CoefficientOverflow { letter: 'A' },
        ]
    }

    #[test]
    fn test_error_codes_and_help() {
        let err = ParseError::MissingSymbol { symbol: '=' };
        assert_eq!(err.code(), "E002");
        assert!(err.help().is_some());
        let detailed = err.display_detailed();
        assert!(detailed.contains("E002"));
        assert!(detailed.contains("WORD + WORD = WORD"));
    }

    /// Test that all `ParseError` variants have unique error codes
    #[test]
    fn test_all_error_codes_are_unique() {
        let mut codes = std::collections::HashSet::new();
        for err in all_variants() {
            let code = err.code();
            assert!(code.starts_with('E'), "Error code '{}' should start with 'E'", code);
            assert!(codes.insert(code), "Duplicate error code found: {}", code);
        }
        assert_eq!(codes.len(), 10);
    }

    /// Test that all error codes follow the format E0XX
    #[test]
    fn test_error_code_format() {
        for err in all_variants() {
            let code = err.code();
            assert_eq!(code.len(), 4, "Error code '{}' should be 4 characters (E0XX)", code);
            assert!(code.starts_with("E0"));
            assert!(code[1..].parse::<u16>().is_ok());
        }
    }

    #[test]
    fn test_help_text_is_not_the_message() {
        for err in all_variants() {
            if let Some(help_text) = err.help() {
                assert!(help_text.len() > 10, "Help text for {:?} should be substantial", err);
                assert_ne!(help_text, err.to_string());
            }
        }
    }

    #[test]
    fn test_display_detailed_without_help() {
        let err = ParseError::WordTooLong { word: "ABC".to_string(), max: 2 };
        assert_eq!(err.display_detailed(), "Word \"ABC\" is longer than 2 letters (E007)");
    }
}
