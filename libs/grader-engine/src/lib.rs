//! Grading pipeline: harness generation, remote dispatch, output normalization,
//! structural comparison and per-submission aggregation.

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod harness;
pub mod normalizer;
pub mod signature;

#[cfg(test)]
mod engine_tests;

pub use config::LanguageTable;
pub use engine::{ExecutionBackend, Judge0Client};
pub use error::{GradeError, HarnessError, TransportError};
pub use executor::{Grader, GraderOptions};
