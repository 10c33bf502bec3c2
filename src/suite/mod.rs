//! Test suite data model and JSON loading
//!
//! Defines the structures deserialized from a JSON suite document. A suite
//! holds ordered test cases; a case holds ordered steps plus a declared
//! variable namespace. These types are inert data: execution lives in
//! [`crate::engine::CaseRunner`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::common::{Error, Result};
use crate::engine::retry::RetryPolicy;

/// A single executable unit: one function invocation plus its
/// expected-outcome check.
#[derive(Deserialize, Debug, Clone)]
pub struct TestStep {
    /// Symbolic function name, resolved in the registry at run time
    pub function: String,

    /// Ordered positional inputs (may contain `${var}` templates)
    #[serde(default)]
    pub input_args: Vec<Value>,

    /// Named inputs, same substitution rules
    #[serde(default)]
    pub input_kwargs: Map<String, Value>,

    /// Value the actual result is compared against; absent means the step
    /// performs no comparison unless the assertion type is nullity-based
    pub expected_result: Option<Value>,

    /// Path expression applied to the raw result before comparison,
    /// e.g. `body.items[0].id`
    pub expected_key: Option<String>,

    /// Symbolic comparator name, case-insensitive
    #[serde(default = "default_assertion")]
    pub assertion_type: String,

    /// Total number of attempts for the retry controller (min 1)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay: f64,

    /// Human-readable label used for reporting
    #[serde(default = "default_description")]
    pub description: String,

    /// Variable name under which the raw result is stored for later steps
    pub save_result_to: Option<String>,
}

impl TestStep {
    /// Retry policy for this step (attempts clamped to at least one,
    /// negative delays treated as zero, oversized delays saturated)
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::try_from_secs_f64(self.retry_delay.max(0.0))
            .unwrap_or(Duration::MAX);
        RetryPolicy::new(self.retry_count, delay)
    }
}

fn default_assertion() -> String {
    "equal_to".to_string()
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay() -> f64 {
    1.0
}

fn default_description() -> String {
    "No step description provided".to_string()
}

/// An ordered collection of steps sharing a variable namespace
#[derive(Deserialize, Debug, Clone)]
pub struct TestCase {
    /// What the case verifies
    pub description: Option<String>,

    /// Grouping/filtering tag
    pub tag: Option<String>,

    /// Initial variable namespace, copied into a per-run namespace at
    /// case start
    #[serde(default)]
    pub variables: Map<String, Value>,

    /// Precondition steps; a failure here short-circuits the case
    #[serde(default)]
    pub setup_steps: Vec<TestStep>,

    /// Main steps, executed strictly in order
    #[serde(default)]
    pub steps: Vec<TestStep>,

    /// Cleanup steps, always executed once the main phase was entered
    #[serde(default)]
    pub teardown_steps: Vec<TestStep>,
}

impl TestCase {
    /// Label used in reports and console output
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or("unnamed test case")
    }
}

/// Top-level container: a loading/grouping artifact with no execution
/// behavior of its own
#[derive(Deserialize, Debug, Clone)]
pub struct TestSuite {
    pub description: Option<String>,

    #[serde(default)]
    pub tag: Vec<String>,

    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    /// Parse a suite from a JSON string and validate its shape
    pub fn from_json(content: &str) -> Result<Self> {
        let suite: TestSuite = serde_json::from_str(content)
            .map_err(|e| Error::Schema(e.to_string()))?;
        suite.validate()?;
        Ok(suite)
    }

    /// Schema validation beyond what serde enforces: a suite without test
    /// cases, or a case without steps, is rejected at load time.
    pub fn validate(&self) -> Result<()> {
        if self.test_cases.is_empty() {
            return Err(Error::Schema("no test cases found".to_string()));
        }
        for case in &self.test_cases {
            if case.steps.is_empty() {
                return Err(Error::Schema(format!(
                    "test case '{}' has no steps",
                    case.label()
                )));
            }
        }
        Ok(())
    }
}

/// Load a test suite from a JSON file
pub fn load_suite(path: &Path) -> Result<TestSuite> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    TestSuite::from_json(&content)
}
