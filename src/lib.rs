// Reusable library API shared by the binaries
pub mod coefficients;
pub mod errors;
pub mod log;
pub mod model;
pub mod parser;
pub mod render;
pub mod sampler;
pub mod side;
pub mod variable;

mod puzzle_char;
pub use puzzle_char::{MAX_WORD_LEN, NUM_DIGITS};
