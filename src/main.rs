use std::process::ExitCode;
use std::time::{Duration, Instant};
use clap::Parser;

use cryptarithm::coefficients::LetterTally;
use cryptarithm::model::build_dqm;
use cryptarithm::parser::parse_problem_file;
use cryptarithm::render::{render_solution, Assignment};
use cryptarithm::sampler::{
    parse_time_limit, LocalDqmSampler, SampleParams, Sampler, SolveStatus, SolverError, DEFAULT_TIME_LIMIT_SECS,
};
use cryptarithm::variable::build_variable_list;

/// Solve a cryptarithm by sampling its discrete quadratic model
#[derive(Parser, Debug)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
struct Cli {
    /// Puzzle file; only the first line is read (e.g., "SEND + MORE = MONEY")
    #[arg(default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/puzzle_files/example1.txt"))]
    filename: String,

    /// Sampling time limit in seconds
    #[arg(short, long, default_value_t = DEFAULT_TIME_LIMIT_SECS, value_parser = parse_time_limit)]
    time_limit: f64,

    /// Seed for the sampler's random number generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Sample the model as built, without dropping all-zero interactions
    #[arg(long)]
    no_compress: bool,
}

/// Entry point of the DQM cryptarithm solver.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    // Set up logging
    cryptarithm::log::init_logger(cryptarithm::log::debug_requested());

    log::info!("Starting cryptarithm solver (DQM)");

    if let Err(e) = try_main() {
        if let Some(solver_err) = e.downcast_ref::<SolverError>() {
            eprintln!("Error: {}", solver_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Core application logic.
///
/// Steps:
/// 1. Parse CLI arguments with Clap.
/// 2. Read and parse the puzzle, then print its letter variables.
/// 3. Build the DQM and sample it.
/// 4. Print the best assignment and the solution line on stdout.
/// 5. Print sampler status and timings on stderr.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 1. Parse the puzzle and build the model
    let t_build = Instant::now();
    let puzzle = parse_problem_file(&cli.filename)?;
    let tally = LetterTally::from_puzzle(&puzzle);
    let variables = build_variable_list(&tally);
    for var in &variables {
        println!("{var}");
    }
    let dqm = build_dqm(&variables, tally.coefficient_map());
    let build_secs = t_build.elapsed().as_secs_f64();

    // 2. Sample until a zero-energy assignment turns up or time runs out
    let params = SampleParams {
        time_limit: Duration::from_secs_f64(cli.time_limit),
        compress: !cli.no_compress,
        seed: cli.seed,
        target_energy: Some(0.0),
        ..SampleParams::default()
    };
    let t_sample = Instant::now();
    let sampleset = LocalDqmSampler::default().sample(&dqm, &params)?;
    let sample_secs = t_sample.elapsed().as_secs_f64();

    // 3. Render the best sample
    match sampleset.first() {
        Some(best) => {
            let assignment = Assignment::from_case_indices(&variables, &best.values)?;
            println!("{assignment}");
            println!("{}", render_solution(&puzzle, &assignment));
        }
        None => println!("Solution not found this run, no samples were returned"),
    }

    match &sampleset.status {
        SolveStatus::TimedOut { .. } => eprintln!("⚠️  Sampler {}; the best sample so far is shown", sampleset.status),
        status => eprintln!("✓ Sampler stopped: {status}"),
    }

    // 4. Print diagnostics to stderr
    eprintln!(
        "Built model for {} letters in {:.3}s; sampled in {:.3}s ({} samples, best energy {}).",
        variables.len(),
        build_secs,
        sample_secs,
        sampleset.len(),
        sampleset.first().map_or_else(|| "n/a".to_string(), |s| s.energy.to_string())
    );

    Ok(())
}
