//! `bench_local.rs`: quick local timing runner (no Criterion)
//!
//! PURPOSE
//! -------
//! - Ad-hoc timing of model building and local sampling for a handful of puzzles.
//! - Runs each puzzle several times and reports the median.
//! - Every run uses a fixed seed so repeats do the same work.
//!
//! HOW TO RUN
//! ----------
//! - Optimized build:                `cargo run --bin bench_local --release`
//! - Multiple repeats:               `cargo run --bin bench_local --release -- -r 5`
//! - Shorter sampling budget:        `cargo run --bin bench_local --release -- -t 1`
//!
//! NOTES
//! -----
//! - Not statistically rigorous; use the same machine and `--release`.
//! - Puzzles live in `get_cases()` below.
//! - One warm-up run per puzzle is done (not included in timing).

use clap::Parser;
use std::hint::black_box;
use std::time::{Duration, Instant};

use cryptarithm::coefficients::LetterTally;
use cryptarithm::model::{build_cqm, build_dqm};
use cryptarithm::parser::Puzzle;
use cryptarithm::render::{render_solution, Assignment};
use cryptarithm::sampler::{
    parse_time_limit, LocalCqmSampler, LocalDqmSampler, SampleParams, Sampler, SolverError, DEFAULT_TIME_LIMIT_SECS,
};
use cryptarithm::variable::{build_variable_list, LetterVariable};

/// Time model building and local sampling for a fixed set of puzzles.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of repeats per puzzle (median is reported)
    #[arg(short = 'r', long = "repeats", default_value_t = 1)]
    num_repeats: usize,

    /// Sampling time limit in seconds, per run
    #[arg(short, long, default_value_t = DEFAULT_TIME_LIMIT_SECS, value_parser = parse_time_limit)]
    time_limit: f64,
}

const SEED: u64 = 2024;
const MAX_STATEMENT_LEN: usize = 28;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ModelKind {
    Dqm,
    Cqm,
}

/// One timed run: seconds spent building, seconds spent sampling, and whether it solved the puzzle.
type RunTiming = (f64, f64, bool);

fn get_cases() -> Vec<&'static str> {
    vec![
        "A + B = C",
        "I + I = AM",
        "TO + GO = OUT",
        "SEND + MORE = MONEY",
    ]
}

/// Small helper: robust central tendency for small samples.
fn median(mut xs: Vec<f64>) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f64::total_cmp);
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        0.5 * (xs[n / 2 - 1] + xs[n / 2])
    }
}

fn run_once(puzzle: &Puzzle, kind: ModelKind, params: &SampleParams) -> Result<RunTiming, SolverError> {
    let t_build = Instant::now();
    let tally = LetterTally::from_puzzle(puzzle);
    let variables: Vec<LetterVariable> = build_variable_list(&tally);

    let (build_secs, sampleset) = match kind {
        ModelKind::Dqm => {
            let dqm = black_box(build_dqm(&variables, tally.coefficient_map()));
            let build_secs = t_build.elapsed().as_secs_f64();
            (build_secs, LocalDqmSampler::default().sample(&dqm, params)?)
        }
        ModelKind::Cqm => {
            let cqm = black_box(build_cqm(&variables));
            let build_secs = t_build.elapsed().as_secs_f64();
            (build_secs, LocalCqmSampler::default().sample(&cqm, params)?.filter_feasible())
        }
    };
    let sample_secs = t_build.elapsed().as_secs_f64() - build_secs;

    let solved = match (kind, sampleset.first()) {
        (ModelKind::Dqm, Some(best)) => render_solution(puzzle, &Assignment::from_case_indices(&variables, &best.values)?).found,
        (ModelKind::Cqm, Some(best)) => render_solution(puzzle, &Assignment::from_integer_values(&variables, &best.values)?).found,
        (_, None) => false,
    };
    Ok((build_secs, sample_secs, solved))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// One row in the benchmark summary: (puzzle, model kind, median build s, median sample s, runs solved).
    type SummaryRow = (String, ModelKind, f64, f64, usize);

    let cli = Cli::parse();
    let params = SampleParams {
        time_limit: Duration::from_secs_f64(cli.time_limit),
        seed: Some(SEED),
        target_energy: Some(0.0),
        ..SampleParams::default()
    };

    let cases = get_cases();
    let mut summary: Vec<SummaryRow> = Vec::with_capacity(2 * cases.len());

    for (idx, statement) in cases.iter().enumerate() {
        let puzzle: Puzzle = statement.parse()?;
        for kind in [ModelKind::Dqm, ModelKind::Cqm] {
            eprintln!("\n[{:02}] {} ({:?})", idx + 1, statement, kind);

            // Warm-up, not timed
            if let Err(e) = run_once(&puzzle, kind, &params) {
                eprintln!("  ✗ Warm-up failed: {}", e.display_detailed());
                continue;
            }

            let mut build_times = Vec::with_capacity(cli.num_repeats);
            let mut sample_times = Vec::with_capacity(cli.num_repeats);
            let mut num_solved = 0;
            for rep in 0..cli.num_repeats {
                let (build_secs, sample_secs, solved) = match run_once(&puzzle, kind, &params) {
                    Ok(timing) => timing,
                    Err(e) => {
                        eprintln!("  ✗ Run {}/{} failed: {}", rep + 1, cli.num_repeats, e);
                        continue;
                    }
                };
                build_times.push(build_secs);
                sample_times.push(sample_secs);
                num_solved += usize::from(solved);
                eprintln!(
                    "  run {:>2}/{:>2}: build {:.3}s, sample {:.3}s ({})",
                    rep + 1,
                    cli.num_repeats,
                    build_secs,
                    sample_secs,
                    if solved { "solved" } else { "not solved" }
                );
            }

            let (build_med, sample_med) = (median(build_times), median(sample_times));
            eprintln!(
                "  → median build {:.3}s, sample {:.3}s; solved {} of {} {}",
                build_med,
                sample_med,
                num_solved,
                cli.num_repeats,
                pluralizer(cli.num_repeats, "run".into(), None)
            );
            summary.push((statement.to_string(), kind, build_med, sample_med, num_solved));
        }
    }

    // Compact summary at the end for a quick scan across all puzzles.
    eprintln!("\n==== Summary ====");
    eprintln!(
        "{:<MAX_STATEMENT_LEN$} | {:>5} | {:>9} | {:>10} | {:>6}",
        "puzzle", "model", "build (s)", "sample (s)", "solved"
    );
    eprintln!(
        "{:-<MAX_STATEMENT_LEN$}-+-{:-<5}-+-{:-<9}-+-{:-<10}-+-{:-<6}",
        "", "", "", "", ""
    );
    for (statement, kind, build_med, sample_med, num_solved) in &summary {
        let display = if statement.len() > MAX_STATEMENT_LEN {
            // "- 1" for the "…"
            format!("{}…", statement.chars().take(MAX_STATEMENT_LEN - 1).collect::<String>())
        } else {
            statement.clone()
        };
        let kind = format!("{kind:?}");
        eprintln!(
            "{display:<MAX_STATEMENT_LEN$} | {kind:>5} | {build_med:>9.3} | {sample_med:>10.3} | {num_solved:>6}"
        );
    }

    Ok(())
}

fn pluralizer(count: usize, singular: String, plural: Option<String>) -> String {
    if count == 1 {
        singular
    } else {
        plural.unwrap_or_else(|| singular + "s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralizer() {
        assert_eq!(pluralizer(0, "run".into(), None), "runs");
        assert_eq!(pluralizer(1, "run".into(), None), "run");
        assert_eq!(pluralizer(2, "radius".into(), Some("radii".into())), "radii");
        assert_eq!(pluralizer(1, "radius".into(), Some("radii".into())), "radius");
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_cases_parse() {
        for statement in get_cases() {
            assert!(statement.parse::<Puzzle>().is_ok(), "{statement} should parse");
        }
    }

    #[test]
    fn test_run_once_solves_small_puzzle() {
        let puzzle: Puzzle = "A + B = C".parse().unwrap();
        let params = SampleParams { seed: Some(SEED), target_energy: Some(0.0), ..SampleParams::default() };
        for kind in [ModelKind::Dqm, ModelKind::Cqm] {
            let (_, _, solved) = run_once(&puzzle, kind, &params).unwrap();
            assert!(solved, "{kind:?} should solve A + B = C");
        }
    }
}
