//! Solver adapter: the [`Sampler`] contract, its parameters and response, and
//! local samplers for both model kinds.
//!
//! A sampler takes a model and a time budget and returns a best-effort
//! [`SampleSet`]. The set may be empty or hold only infeasible samples; callers
//! decide what to do with that.
//!
//! # Error Handling
//!
//! Sampling and the pipeline around it use [`SolverError`]:
//!
//! - S001: `ParseFailure` (Puzzle parsing failed (wraps [`ParseError`]))
//! - S002: `Io` (Puzzle file could not be read)
//! - S003: `EmptyModel` (Model has no variables)
//! - S004: `SampleMismatch` (Sample length differs from the variable list)
//!
//! # Examples
//!
//! ```
//! use cryptarithm::coefficients::LetterTally;
//! use cryptarithm::model::build_dqm;
//! use cryptarithm::parser::Puzzle;
//! use cryptarithm::sampler::{LocalDqmSampler, SampleParams, Sampler};
//! use cryptarithm::variable::build_variable_list;
//!
//! let puzzle: Puzzle = "I + I = AM".parse()?;
//! let tally = LetterTally::from_puzzle(&puzzle);
//! let variables = build_variable_list(&tally);
//! let dqm = build_dqm(&variables, tally.coefficient_map());
//!
//! let params = SampleParams { seed: Some(7), target_energy: Some(0.0), ..SampleParams::default() };
//! let sampleset = LocalDqmSampler::default().sample(&dqm, &params)?;
//! assert_eq!(sampleset.first().map(|s| s.energy), Some(0.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cqm;
pub mod dqm;

pub use cqm::LocalCqmSampler;
pub use dqm::LocalDqmSampler;

use crate::errors::ParseError;
use instant::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::time::Duration;

/// Default sampling time budget, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 5.0;
/// Largest search space the local samplers enumerate instead of annealing.
pub const EXHAUSTIVE_LIMIT: u128 = 1_000_000;
// The number of best distinct samples kept in a response
pub(crate) const MAX_RETAINED: usize = 16;
// How many steps run between clock checks
pub(crate) const BUDGET_CHECK_INTERVAL: usize = 4096;

/// Unified error type for loading puzzles and sampling models.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The puzzle statement could not be parsed.
    #[error("parse failure: {0}")]
    ParseFailure(#[from] Box<ParseError>),

    /// The puzzle file could not be read.
    #[error("cannot read puzzle file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A model without variables was handed to a sampler.
    #[error("model has no variables to sample")]
    EmptyModel,

    /// A sample does not assign exactly one value per puzzle letter.
    #[error("sample has {found} values but the puzzle has {expected} letters")]
    SampleMismatch { expected: usize, found: usize },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "S001",
            SolverError::Io { .. } => "S002",
            SolverError::EmptyModel => "S003",
            SolverError::SampleMismatch { .. } => "S004",
        }
    }

    /// Returns a short description of this error type (for documentation)
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "Puzzle parsing failed",
            SolverError::Io { .. } => "Puzzle file could not be read",
            SolverError::EmptyModel => "Model has no variables",
            SolverError::SampleMismatch { .. } => "Sample length differs from the variable list",
        }
    }

    /// Returns detailed explanation of this error type (for documentation)
    #[must_use]
    pub fn details(&self) -> &'static str {
        match self {
            SolverError::ParseFailure(_) => "The puzzle statement could not be parsed. This wraps an underlying ParseError (see Parse Errors section for specific error codes).",
            SolverError::Io { .. } => "The puzzle file does not exist or is not readable. Only the first line of the file is used.",
            SolverError::EmptyModel => "Samplers need at least one variable. Models built from a parsed puzzle always have one; this indicates a hand-built model.",
            SolverError::SampleMismatch { .. } => "A sample must assign one value per letter, in variable-list order. This usually means the sample came from a different model.",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::Io { .. } => Some("Check the path; the default is puzzle_files/example1.txt"),
            SolverError::EmptyModel => Some("Add variables to the model before sampling it"),
            SolverError::SampleMismatch { .. } => Some("Render samples with the variable list the model was built from"),
            SolverError::ParseFailure(_) => None, // ParseError has its own help
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self {
            SolverError::ParseFailure(pe) => {
                // delegate to ParseError's detailed display
                format!("{}\n  caused by: {}", self.code(), pe.display_detailed())
            }
            _ => crate::errors::format_error_with_code_and_help(&self.to_string(), self.code(), self.help()),
        }
    }
}

/// Why a sampler stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// Every assignment was enumerated.
    Exhausted,

    /// A sample at or below the target energy was found.
    TargetReached,

    /// The requested number of annealing reads finished.
    ReadsCompleted,

    /// The time budget expired. Contains the elapsed time.
    TimedOut { elapsed: Duration },
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Exhausted => write!(f, "every assignment was enumerated"),
            SolveStatus::TargetReached => write!(f, "target energy reached"),
            SolveStatus::ReadsCompleted => write!(f, "all requested reads completed"),
            SolveStatus::TimedOut { elapsed } => write!(f, "timed out after {:.1}s", elapsed.as_secs_f64()),
        }
    }
}

/// Parse a time limit in seconds from the command line.
///
/// # Errors
///
/// Rejects anything that is not a finite, non-negative number.
pub fn parse_time_limit(s: &str) -> Result<f64, String> {
    let secs: f64 = s.trim().parse().map_err(|_| format!("`{s}` is not a number of seconds"))?;
    if secs.is_finite() && secs >= 0.0 {
        Ok(secs)
    } else {
        Err(format!("time limit must be a non-negative number of seconds, got {s}"))
    }
}

/// Parameters passed with every sampling call.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleParams {
    /// Wall-clock budget for the call.
    pub time_limit: Duration,
    /// Compact the model (drop zero terms) before sampling.
    pub compress: bool,
    /// Free-form label echoed back in the response.
    pub label: String,
    /// RNG seed; `None` draws a fresh one.
    pub seed: Option<u64>,
    /// Stop after this many annealing reads; `None` reads until the budget runs out.
    pub num_reads: Option<usize>,
    /// Stop as soon as a feasible sample reaches this energy.
    pub target_energy: Option<f64>,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs_f64(DEFAULT_TIME_LIMIT_SECS),
            compress: true,
            label: String::from("Example - Cryptarithmetic"),
            seed: None,
            num_reads: None,
            target_energy: None,
        }
    }
}

impl SampleParams {
    pub(crate) fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed.unwrap_or_else(rand::random))
    }

    pub(crate) fn reached_target(&self, energy: f64, feasible: bool) -> bool {
        feasible && self.target_energy.is_some_and(|target| energy <= target)
    }
}

/// One assignment returned by a sampler.
///
/// For a DQM, `values` are case indices; for a CQM, they are variable values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub values: Vec<i64>,
    pub energy: f64,
    pub feasible: bool,
    pub num_occurrences: usize,
}

/// Response of a sampling call, ordered feasible-first then by energy.
#[derive(Debug, Clone)]
pub struct SampleSet {
    samples: Vec<Sample>,
    /// Why the sampler stopped.
    pub status: SolveStatus,
    /// The label from `SampleParams`.
    pub label: String,
    /// Wall-clock time spent sampling.
    pub elapsed: Duration,
}

impl SampleSet {
    #[must_use]
    pub fn new(mut samples: Vec<Sample>, status: SolveStatus, label: String, elapsed: Duration) -> Self {
        sort_samples(&mut samples);
        Self { samples, status, label, elapsed }
    }

    /// Lowest-energy sample, preferring feasible ones.
    #[must_use]
    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Merge samples with identical values, summing their occurrences.
    #[must_use]
    pub fn aggregate(self) -> Self {
        let mut seen: HashMap<Vec<i64>, usize> = HashMap::with_capacity(self.samples.len());
        let mut merged: Vec<Sample> = Vec::with_capacity(self.samples.len());
        for sample in self.samples {
            match seen.get(&sample.values) {
                Some(&idx) => merged[idx].num_occurrences += sample.num_occurrences,
                None => {
                    seen.insert(sample.values.clone(), merged.len());
                    merged.push(sample);
                }
            }
        }
        Self::new(merged, self.status, self.label, self.elapsed)
    }

    /// Keep only feasible samples.
    #[must_use]
    pub fn filter_feasible(mut self) -> Self {
        self.samples.retain(|s| s.feasible);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

impl IntoIterator for SampleSet {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Something that can search a model for low-energy assignments.
pub trait Sampler<M> {
    /// Sample `model` within the limits in `params`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the model cannot be sampled at all.
    fn sample(&self, model: &M, params: &SampleParams) -> Result<SampleSet, SolverError>;
}

fn sort_samples(samples: &mut [Sample]) {
    samples.sort_by(|a, b| b.feasible.cmp(&a.feasible).then(a.energy.total_cmp(&b.energy)));
}

/// Best distinct samples seen so far, capped at `MAX_RETAINED`.
#[derive(Debug, Default)]
pub(crate) struct Retained {
    samples: Vec<Sample>,
}

impl Retained {
    pub(crate) fn offer(&mut self, values: &[i64], energy: f64, feasible: bool) {
        if let Some(existing) = self.samples.iter_mut().find(|s| s.values == values) {
            existing.num_occurrences += 1;
            return;
        }
        if self.samples.len() >= MAX_RETAINED {
            // samples are kept sorted, so the last one is the worst
            let worse_than_worst = self
                .samples
                .last()
                .is_some_and(|w| (w.feasible, -w.energy) >= (feasible, -energy));
            if worse_than_worst {
                return;
            }
            self.samples.pop();
        }
        self.samples.push(Sample { values: values.to_vec(), energy, feasible, num_occurrences: 1 });
        sort_samples(&mut self.samples);
    }

    pub(crate) fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Simple helper to enforce a wall-clock time limit.
pub(crate) struct TimeBudget {
    start: Instant,   // when the budget began
    limit: Duration,  // maximum allowed elapsed time
}

impl TimeBudget {
    pub(crate) fn new(limit: Duration) -> Self {
        Self { start: Instant::now(), limit }
    }

    /// How long this budget has been running.
    pub(crate) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns true if the allowed time has fully elapsed.
    pub(crate) fn expired(&self) -> bool {
        self.start.elapsed() >= self.limit
    }

    pub(crate) fn timed_out(&self) -> SolveStatus {
        SolveStatus::TimedOut { elapsed: self.elapsed() }
    }
}

/// Geometric inverse-temperature schedule from `hot` to `cold` over `steps` steps.
pub(crate) fn beta_schedule(hot: f64, cold: f64, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![cold];
    }
    let ratio = (cold / hot).powf(1.0 / (steps - 1) as f64);
    std::iter::successors(Some(hot), |b| Some(b * ratio)).take(steps).collect()
}

/// Hot and cold inverse temperatures for energy gaps between `min_gap` and `max_gap`.
///
/// At the hot end the largest uphill move is accepted half the time; at the
/// cold end the smallest is accepted once in a hundred.
pub(crate) fn beta_range(min_gap: f64, max_gap: f64) -> (f64, f64) {
    let min_gap = if min_gap > 0.0 { min_gap } else { 1.0 };
    let max_gap = if max_gap > 0.0 { max_gap } else { min_gap };
    (std::f64::consts::LN_2 / max_gap, 100f64.ln() / min_gap)
}
