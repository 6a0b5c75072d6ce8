//! Generate error code documentation from the source of truth (error enums).
//!
//! This binary reads the error codes, descriptions, details, and help text
//! directly from the `ParseError` and `SolverError` implementations via their
//! `code()`, `description()`, `details()`, and `help()` methods.
//!
//! Run with:
//! ```bash
//! cargo run --bin generate_error_docs > docs/ERROR_CODES.md
//! ```

use cryptarithm::errors::ParseError;
use cryptarithm::sampler::SolverError;
use cryptarithm::side::Side;
use cryptarithm::MAX_WORD_LEN;
use std::io;

/// Macro to generate error documentation for any error type
/// with `code()`, `description()`, `details()`, `help()`, and `display_detailed()` methods
macro_rules! generate_error_docs {
    ($errors:expr) => {
        for error in $errors {
            let code = error.code();
            let description = error.description();
            let details = error.details();
            let help = error.help();

            println!("### {}: {}\n", code, description);
            println!("**Details:** {}\n", details);

            if let Some(help_text) = help {
                println!("**How to fix:**");
                println!("```");
                println!("{}", help_text);
                println!("```\n");
            }

            println!("**Example error message:**");
            println!("```");
            println!("{}", error);
            println!("```\n");

            println!("**Detailed format:**");
            println!("```");
            println!("{}", error.display_detailed());
            println!("```\n");

            println!("---\n");
        }
    };
}

/// Helper to create all `ParseError` variants for documentation
fn all_parse_error_variants() -> Vec<ParseError> {
    vec![
        ParseError::ForbiddenOperator { op: '*' },
        ParseError::MissingSymbol { symbol: '=' },
        ParseError::MultipleEquals { count: 2 },
        ParseError::EmptyStatement,
        ParseError::EmptyWord { side: Side::Left },
        ParseError::InvalidCharacter { word: "SE7EN".to_string(), invalid_char: '7' },
        ParseError::WordTooLong { word: "A".repeat(MAX_WORD_LEN + 1), max: MAX_WORD_LEN },
        ParseError::TooManyLetters { count: 11 },
        // NomError--use a common error kind
        ParseError::NomError(nom::error::ErrorKind::Eof),
        ParseError::CoefficientOverflow { letter: 'A' },
    ]
}

/// Helper to create all `SolverError` variants for documentation
fn all_solver_error_variants() -> Vec<SolverError> {
    vec![
        SolverError::ParseFailure(Box::new(ParseError::MissingSymbol { symbol: '+' })),
        SolverError::Io {
            path: "puzzle_files/missing.txt".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        },
        SolverError::EmptyModel,
        SolverError::SampleMismatch { expected: 8, found: 7 },
    ]
}

fn main() {
    println!("# Error Code Reference\n");
    println!("**⚠️ This document is auto-generated from the source code. Do not edit manually.**\n");

    println!("## Table of Contents\n");
    println!("- [Solver Errors (S001–S004)](#solver-errors)");
    println!("- [Parse Errors (E001–E010)](#parse-errors)");
    println!("- [How to Use Error Codes](#how-to-use-error-codes)\n");

    generate_solver_error_docs();
    generate_parse_error_docs();

    println!("\n## How to Use Error Codes\n");
    println!("When you see an error like:\n");
    println!("```");
    println!("Error: S001\n  caused by: Missing '=' in puzzle statement (E002)");
    println!("Expected format: WORD + WORD = WORD");
    println!("```\n");
    println!("1. Note the error code (e.g., `E002`)");
    println!("2. Look it up in this document for detailed explanation");
    println!("3. Follow the suggested resolution steps\n");

    println!("## Error Display Formats\n");
    println!("Errors are displayed in two formats:\n");
    println!("### Simple Format");
    println!("```");
    println!("Error: <message>");
    println!("```\n");
    println!("### Detailed Format (via `display_detailed()`)");
    println!("```");
    println!("<message> (<code>)");
    println!("<help text if available>");
    println!("```\n");
}

fn generate_solver_error_docs() {
    println!("## Solver Errors\n");
    println!("Errors from loading a puzzle or sampling a model. These wrap lower-level parse errors or indicate sampler-specific issues.\n");
    generate_error_docs!(all_solver_error_variants());
}

fn generate_parse_error_docs() {
    println!("## Parse Errors\n");
    println!("Errors that occur when parsing a puzzle statement.\n");
    generate_error_docs!(all_parse_error_variants());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_parse_code_is_documented() {
        let codes: HashSet<_> = all_parse_error_variants().iter().map(ParseError::code).collect();
        let expected: HashSet<_> = (1..=10).map(|n| format!("E{n:03}")).collect();
        assert_eq!(codes.iter().map(|c| c.to_string()).collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn test_every_solver_code_is_documented() {
        let codes: Vec<_> = all_solver_error_variants().iter().map(SolverError::code).collect();
        assert_eq!(codes, vec!["S001", "S002", "S003", "S004"]);
    }
}
