use std::process::ExitCode;
use std::time::{Duration, Instant};
use clap::Parser;

use cryptarithm::coefficients::LetterTally;
use cryptarithm::model::build_cqm;
use cryptarithm::parser::parse_problem_file;
use cryptarithm::render::render_best_cqm_sample;
use cryptarithm::sampler::{
    parse_time_limit, LocalCqmSampler, SampleParams, Sampler, SolveStatus, SolverError, DEFAULT_TIME_LIMIT_SECS,
};
use cryptarithm::variable::build_variable_list;

/// Solve a cryptarithm by sampling its constrained quadratic model
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

    /// Sample the model as built, without dropping zero-weight terms
    #[arg(long)]
    no_compress: bool,
}

fn main() -> ExitCode {
    cryptarithm::log::init_logger(cryptarithm::log::debug_requested());

    log::info!("Starting cryptarithm solver (CQM)");

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

/// Same flow as the DQM binary, with feasibility deciding which samples count.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let t_build = Instant::now();
    let puzzle = parse_problem_file(&cli.filename)?;
    let variables = build_variable_list(&LetterTally::from_puzzle(&puzzle));
    for var in &variables {
        println!("{var}");
    }
    let cqm = build_cqm(&variables);
    let build_secs = t_build.elapsed().as_secs_f64();

    let params = SampleParams {
        time_limit: Duration::from_secs_f64(cli.time_limit),
        compress: !cli.no_compress,
        seed: cli.seed,
        target_energy: Some(0.0),
        ..SampleParams::default()
    };
    let t_sample = Instant::now();
    let sampleset = LocalCqmSampler::default().sample(&cqm, &params)?;
    let sample_secs = t_sample.elapsed().as_secs_f64();
    let num_samples = sampleset.len();

    let num_feasible = sampleset.iter().filter(|s| s.feasible).count();
    if num_feasible == 0 {
        log::warn!("no feasible sample among {num_samples}");
    }

    // Falls back to the least-violating sample when nothing is feasible
    match render_best_cqm_sample(&puzzle, &variables, &sampleset)? {
        Some((assignment, rendering)) => {
            println!("{assignment}");
            println!("{rendering}");
        }
        None => println!("Solution not found this run, no samples were returned"),
    }

    match &sampleset.status {
        SolveStatus::TimedOut { .. } => eprintln!("⚠️  Sampler {}; the best sample so far is shown", sampleset.status),
        status => eprintln!("✓ Sampler stopped: {status}"),
    }

    eprintln!(
        "Built model with {} variables and {} constraints in {:.3}s; sampled in {:.3}s ({} samples, {} feasible).",
        cqm.num_variables(),
        cqm.num_constraints(),
        build_secs,
        sample_secs,
        num_samples,
        num_feasible
    );

    Ok(())
}
