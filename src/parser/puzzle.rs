//! Parsing of a one-line puzzle statement such as `SEND + MORE = MONEY`.
//!
//! The statement is validated structurally first (forbidden operators, exactly
//! one `=`, at least one `+`), then each side is tokenized with `nom` into a
//! list of words.

use super::utils::{count_distinct_letters, normalize_word, overflowing_letter};
use crate::errors::ParseError;
use crate::puzzle_char::{PuzzleChar, EQUALS, NUM_DIGITS, PLUS};
use crate::sampler::SolverError;
use crate::side::Side;
use log::debug;
use nom::{
    bytes::complete::take_while,
    character::complete::{char, space0},
    combinator::all_consuming,
    multi::separated_list1,
    sequence::{delimited, preceded, terminated},
    IResult,
    Parser,
};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Parser result type: input, output, with our custom `ParseError`
pub type PResult<'a, O> = IResult<&'a str, O, Box<ParseError>>;

/// A parsed puzzle: the summands, the result words, and the statement as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Left-hand side words, uppercase. Example: `["SEND", "MORE"]`
    pub lhs: Vec<String>,
    /// Right-hand side words, uppercase. Example: `["MONEY"]`
    pub rhs: Vec<String>,
    /// The statement line, trimmed.
    pub statement: String,
}

impl Puzzle {
    /// Words on the given side of the `=`.
    #[must_use]
    pub fn words(&self, side: Side) -> &[String] {
        match side {
            Side::Left => &self.lhs,
            Side::Right => &self.rhs,
        }
    }

    /// Number of distinct letters in the puzzle.
    #[must_use]
    pub fn num_letters(&self) -> usize {
        count_distinct_letters(self.lhs.iter().chain(self.rhs.iter()))
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs.join(" + "), self.rhs.join(" + "))
    }
}

impl FromStr for Puzzle {
    type Err = Box<ParseError>;

    /// Parse the first line of `input` into a `Puzzle`.
    ///
    /// Checks run in this order, and the first failure wins:
    /// 1. the line is non-empty,
    /// 2. none of `*`, `-`, `^`, `%` appears,
    /// 3. exactly one `=` appears,
    /// 4. at least one `+` appears,
    /// 5. each side is a `+`-separated list of letter-only words,
    /// 6. there are at most ten distinct letters,
    /// 7. every letter's coefficient fits in an `i64`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let statement = input.lines().next().unwrap_or("").trim();
        if statement.is_empty() {
            return Err(Box::new(ParseError::EmptyStatement));
        }

        if let Some(op) = statement.chars().find(|c| c.is_excluded_operator()) {
            return Err(Box::new(ParseError::ForbiddenOperator { op }));
        }

        let num_equals = statement.matches(EQUALS).count();
        match num_equals {
            0 => return Err(Box::new(ParseError::MissingSymbol { symbol: EQUALS })),
            1 => {}
            count => return Err(Box::new(ParseError::MultipleEquals { count })),
        }

        if !statement.contains(PLUS) {
            return Err(Box::new(ParseError::MissingSymbol { symbol: PLUS }));
        }

        // safe: exactly one '=' was found above
        let (lhs_raw, rhs_raw) = statement.split_once(EQUALS).ok_or(ParseError::MissingSymbol { symbol: EQUALS })?;

        let lhs = side_words(lhs_raw, Side::Left)?;
        let rhs = side_words(rhs_raw, Side::Right)?;

        let puzzle = Puzzle { lhs, rhs, statement: statement.to_string() };

        let count = puzzle.num_letters();
        if count > NUM_DIGITS {
            return Err(Box::new(ParseError::TooManyLetters { count }));
        }

        if let Some(letter) = overflowing_letter(puzzle.lhs.iter().chain(puzzle.rhs.iter())) {
            return Err(Box::new(ParseError::CoefficientOverflow { letter }));
        }

        debug!("parsed puzzle {puzzle} ({count} letters)");
        Ok(puzzle)
    }
}

/// Read the first line of the file at `path` and parse it as a puzzle.
///
/// # Errors
///
/// Returns `SolverError::Io` if the file cannot be read and
/// `SolverError::ParseFailure` if its first line is not a valid puzzle.
pub fn parse_problem_file(path: impl AsRef<Path>) -> Result<Puzzle, SolverError> {
    let path = path.as_ref();
    debug!("reading puzzle from {}", path.display());
    let contents = fs::read_to_string(path).map_err(|source| SolverError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(contents.parse::<Puzzle>()?)
}

// === Token parsers ===

fn plus_sign(input: &str) -> PResult<'_, char> {
    delimited(space0, char(PLUS), space0).parse(input)
}

// Anything up to the next '+' or space; validated afterwards so errors carry the side.
fn raw_word(input: &str) -> PResult<'_, &str> {
    preceded(space0, take_while(|c: char| c != PLUS && !c.is_whitespace())).parse(input)
}

fn word_list(input: &str) -> PResult<'_, Vec<&str>> {
    all_consuming(terminated(separated_list1(plus_sign, raw_word), space0)).parse(input)
}

fn side_words(input: &str, side: Side) -> Result<Vec<String>, Box<ParseError>> {
    let (_, raw_words) = word_list(input).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => Box::new(ParseError::NomError(nom::error::ErrorKind::Complete)),
    })?;

    raw_words.into_iter().map(|raw| normalize_word(raw, side)).collect()
}
