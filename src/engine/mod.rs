//! Test-execution engine
//!
//! Interprets declarative test cases: resolves step inputs against the
//! case's variable namespace, looks up functions by symbolic name, runs the
//! invoke-and-assert cycle under a bounded retry policy, and aggregates
//! per-case results.

pub mod assertion;
pub mod registry;
pub mod resolve;
pub mod retry;
pub mod runner;

pub use registry::{sync_function, FunctionProvider, FunctionRegistry, StepFunction};
pub use runner::{CaseReport, CaseRunner, CaseStatus, StepReport};
