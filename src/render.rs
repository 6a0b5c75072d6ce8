//! Turning samples back into digits and printable solution lines.

use crate::parser::Puzzle;
use crate::sampler::{SampleSet, SolverError};
use crate::side::Side;
use crate::variable::LetterVariable;
use std::collections::HashSet;
use std::fmt;

/// Letter-to-digit map, kept in variable-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    digits: Vec<(char, u8)>,
}

impl Assignment {
    #[must_use]
    pub fn new(digits: Vec<(char, u8)>) -> Self {
        Self { digits }
    }

    /// Map DQM case indices through each variable's domain.
    ///
    /// Case indices outside a domain are clamped to its last case.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::SampleMismatch`] unless there is exactly one value per variable.
    pub fn from_case_indices(variables: &[LetterVariable], values: &[i64]) -> Result<Self, SolverError> {
        if values.len() != variables.len() {
            return Err(SolverError::SampleMismatch { expected: variables.len(), found: values.len() });
        }
        let digits = variables
            .iter()
            .zip(values)
            .map(|(var, &case)| {
                let last = var.domain_len().saturating_sub(1);
                let case = usize::try_from(case).unwrap_or(0).min(last);
                (var.name, var.digit_at(case).unwrap_or(*var.domain().start()))
            })
            .collect();
        Ok(Self { digits })
    }

    /// Read letter values from the front of a CQM sample; indicator binaries follow them and are ignored.
    ///
    /// Values outside a variable's domain are clamped into it.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::SampleMismatch`] if the sample has fewer values than there are variables.
    pub fn from_integer_values(variables: &[LetterVariable], values: &[i64]) -> Result<Self, SolverError> {
        if values.len() < variables.len() {
            return Err(SolverError::SampleMismatch { expected: variables.len(), found: values.len() });
        }
        let digits = variables
            .iter()
            .zip(values)
            .map(|(var, &value)| {
                let domain = var.domain();
                let clamped = value.clamp(i64::from(*domain.start()), i64::from(*domain.end()));
                (var.name, u8::try_from(clamped).unwrap_or(*domain.start()))
            })
            .collect();
        Ok(Self { digits })
    }

    #[must_use]
    pub fn digit(&self, letter: char) -> Option<u8> {
        self.digits.iter().find(|&&(l, _)| l == letter).map(|&(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u8)> + '_ {
        self.digits.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.digits.iter().map(|(l, d)| format!("{l}: {d}")).collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// Value of `word` with each letter replaced by its digit. Unassigned letters count as 0.
#[must_use]
pub fn integer_from_word(word: &str, assignment: &Assignment) -> u64 {
    word.chars().fold(0u64, |acc, letter| {
        acc.saturating_mul(10)
            .saturating_add(u64::from(assignment.digit(letter).unwrap_or(0)))
    })
}

fn side_values(puzzle: &Puzzle, side: Side, assignment: &Assignment) -> Vec<u64> {
    puzzle.words(side).iter().map(|w| integer_from_word(w, assignment)).collect()
}

fn join_side(values: &[u64]) -> String {
    values.iter().map(u64::to_string).collect::<Vec<_>>().join(" + ")
}

/// The puzzle with digits substituted, e.g. `9567 + 1085 = 10652`.
#[must_use]
pub fn build_expression(puzzle: &Puzzle, assignment: &Assignment) -> String {
    format!(
        "{} = {}",
        join_side(&side_values(puzzle, Side::Left, assignment)),
        join_side(&side_values(puzzle, Side::Right, assignment))
    )
}

/// Outcome of checking an assignment against its puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    /// The assignment solves the puzzle: both sides are equal, no two letters
    /// share a digit, and no multi-letter word starts with 0.
    pub found: bool,
    pub expression: String,
    /// The line to print.
    pub line: String,
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}

/// No two letters share a digit and no multi-letter word starts with 0.
#[must_use]
pub fn satisfies_digit_rules(puzzle: &Puzzle, assignment: &Assignment) -> bool {
    let mut seen = HashSet::new();
    if !assignment.iter().all(|(_, digit)| seen.insert(digit)) {
        return false;
    }
    puzzle
        .lhs
        .iter()
        .chain(puzzle.rhs.iter())
        .filter(|word| word.chars().count() > 1)
        .filter_map(|word| word.chars().next())
        .all(|leading| assignment.digit(leading) != Some(0))
}

/// Evaluate both sides under `assignment` and build the result line.
#[must_use]
pub fn render_solution(puzzle: &Puzzle, assignment: &Assignment) -> Rendering {
    let sum = |side| -> u128 { side_values(puzzle, side, assignment).into_iter().map(u128::from).sum() };
    let found = sum(Side::Left) == sum(Side::Right) && satisfies_digit_rules(puzzle, assignment);
    let expression = build_expression(puzzle, assignment);
    let line = if found {
        format!("Solution found for {}, {expression}", puzzle.statement)
    } else {
        closest_line(&expression)
    };
    Rendering { found, expression, line }
}

/// Report `assignment` as the closest the sampler got, whatever it evaluates to.
///
/// Used when the sampler flagged every sample as infeasible.
#[must_use]
pub fn render_closest(puzzle: &Puzzle, assignment: &Assignment) -> Rendering {
    let expression = build_expression(puzzle, assignment);
    let line = closest_line(&expression);
    Rendering { found: false, expression, line }
}

/// Render the best sample of a CQM run.
///
/// Feasible samples win; when there are none, the least-violating sample is
/// shown as the closest assignment and never counts as found.
/// Returns `Ok(None)` for an empty sample set.
///
/// # Errors
///
/// Returns [`SolverError::SampleMismatch`] if the chosen sample is shorter than the variable list.
pub fn render_best_cqm_sample(
    puzzle: &Puzzle,
    variables: &[LetterVariable],
    sampleset: &SampleSet,
) -> Result<Option<(Assignment, Rendering)>, SolverError> {
    let feasible = sampleset.iter().find(|s| s.feasible);
    let Some(best) = feasible.or_else(|| sampleset.first()) else {
        return Ok(None);
    };
    let assignment = Assignment::from_integer_values(variables, &best.values)?;
    let rendering = if feasible.is_some() {
        render_solution(puzzle, &assignment)
    } else {
        render_closest(puzzle, &assignment)
    };
    Ok(Some((assignment, rendering)))
}

fn closest_line(expression: &str) -> String {
    format!("Solution not found this run, closest assignment is {expression}")
}
