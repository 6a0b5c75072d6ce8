pub mod cqm;
pub mod dqm;

// Re-export the builders and model types so call sites can use `model::build_dqm`.
pub use cqm::{build_cqm, ConstrainedQuadraticModel, Sense, Vartype};
pub use dqm::{build_dqm, DiscreteQuadraticModel};
