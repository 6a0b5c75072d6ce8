pub mod puzzle;
mod utils;

// Re-export the public API so call sites can use `parser::Puzzle`.
pub use puzzle::{parse_problem_file, PResult, Puzzle};
