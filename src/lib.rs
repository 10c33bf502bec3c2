//! caseflow - a declarative JSON test-execution engine
//!
//! Test scenarios are authored as structured data rather than procedural
//! code: a suite of cases, each an ordered list of steps naming a registered
//! function, its inputs, and an expected outcome. The engine resolves
//! `${var}` templates between steps, retries flaky assertions, and reports
//! structured pass/fail results.

pub mod cli;
pub mod commands;
pub mod common;
pub mod engine;
pub mod functions;
pub mod report;
pub mod suite;

// Re-export commonly used types for embedders and tests
pub use common::{Error, Result};
pub use engine::{CaseReport, CaseRunner, CaseStatus, FunctionRegistry};
pub use suite::{TestCase, TestStep, TestSuite};
