//! Case runner
//!
//! Drives the lifecycle of one test case: copies the declared variables
//! into a per-run namespace, executes setup/main/teardown steps in order,
//! threads results between steps, and finalizes a case report exactly once.
//!
//! Failure policy: a setup failure short-circuits the case (main and
//! teardown are skipped), the first main-step failure aborts the remaining
//! main steps, and teardown failures are downgraded to warnings. Expected
//! comparison mismatches end the case `Failed`; unexpected faults end it
//! `Errored` and re-raise after the report has been delivered.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::common::{Error, Result};
use crate::report::{AttachmentType, Reporter};
use crate::suite::{TestCase, TestStep};

use super::assertion::{self, AssertionType};
use super::registry::FunctionRegistry;
use super::resolve;
use super::retry;

/// Final state of a case run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    Failed,
    Errored,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Passed => write!(f, "passed"),
            CaseStatus::Failed => write!(f, "failed"),
            CaseStatus::Errored => write!(f, "errored"),
        }
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub description: String,
    pub function: String,
    pub passed: bool,
    /// Number of times the function was invoked; zero means a pre-invocation
    /// failure such as an unknown assertion type or an unbound variable
    pub attempts: u32,
    pub return_value: Option<Value>,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Aggregated outcome of one case run, finalized exactly once
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub description: String,
    pub tag: Option<String>,
    pub status: CaseStatus,
    pub setup: Vec<StepReport>,
    pub steps: Vec<StepReport>,
    pub teardown: Vec<StepReport>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub duration: Duration,
    /// Final state of the case namespace, useful for diagnostics
    pub variables: Map<String, Value>,
}

/// Executes test cases against a function registry
///
/// Holds no per-run state: the variable namespace lives on the stack of
/// each `execute_test_case` call, so one runner can serve concurrent case
/// runs without sharing anything mutable.
pub struct CaseRunner {
    registry: Arc<FunctionRegistry>,
    reporter: Arc<dyn Reporter>,
}

impl CaseRunner {
    pub fn new(registry: Arc<FunctionRegistry>, reporter: Arc<dyn Reporter>) -> Self {
        Self { registry, reporter }
    }

    /// Execute a single test case to completion.
    ///
    /// Returns the finalized report for `Passed`/`Failed` outcomes. An
    /// unexpected fault returns `Err` after the report has been delivered
    /// to the reporter, so no outcome is ever silently discarded.
    pub async fn execute_test_case(&self, case: &TestCase) -> Result<CaseReport> {
        let started = Instant::now();
        let mut variables = case.variables.clone();
        let mut report = CaseReport {
            description: case.label().to_string(),
            tag: case.tag.clone(),
            status: CaseStatus::Passed,
            setup: Vec::new(),
            steps: Vec::new(),
            teardown: Vec::new(),
            warnings: Vec::new(),
            error: None,
            duration: Duration::ZERO,
            variables: Map::new(),
        };
        let mut fault: Option<Error> = None;

        debug!(case = %report.description, "executing test case");

        // Setup steps are precondition checks: the first failure
        // short-circuits the case before main or teardown steps run.
        let mut setup_ok = true;
        for step in &case.setup_steps {
            let (step_report, error) = self.run_step(step, &mut variables).await;
            report.setup.push(step_report);
            if let Some(e) = error {
                setup_ok = false;
                if e.is_step_failure() {
                    report.status = CaseStatus::Failed;
                    report.error = Some(format!("setup step failed: {e}"));
                } else {
                    report.status = CaseStatus::Errored;
                    report.error = Some(e.to_string());
                    fault = Some(e);
                }
                break;
            }
        }

        if setup_ok {
            for step in &case.steps {
                let (step_report, error) = self.run_step(step, &mut variables).await;
                report.steps.push(step_report);
                if let Some(e) = error {
                    if e.is_step_failure() {
                        report.status = CaseStatus::Failed;
                        report.error = Some(e.to_string());
                    } else {
                        report.status = CaseStatus::Errored;
                        report.error = Some(e.to_string());
                        fault = Some(e);
                    }
                    break;
                }
            }

            // Teardown runs unconditionally once the main phase was entered.
            // Failures here are warnings and never change the case status.
            for step in &case.teardown_steps {
                let (step_report, error) = self.run_step(step, &mut variables).await;
                report.teardown.push(step_report);
                if let Some(e) = error {
                    warn!(step = %step.description, "teardown step failed: {e}");
                    report.warnings.push(format!("teardown step failed: {e}"));
                }
            }
        }

        report.duration = started.elapsed();
        report.variables = variables;
        debug!(case = %report.description, status = %report.status, "test case finished");
        self.reporter.case_finished(&report);

        match fault {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Execute one step and translate its outcome into a report entry.
    ///
    /// On success the raw result is bound into the namespace when the step
    /// declares `save_result_to`.
    async fn run_step(
        &self,
        step: &TestStep,
        variables: &mut Map<String, Value>,
    ) -> (StepReport, Option<Error>) {
        self.reporter.begin_step(&step.description);
        let started = Instant::now();
        let invocations = AtomicU32::new(0);

        let outcome = self.run_step_inner(step, variables, &invocations).await;

        let attempts = invocations.load(Ordering::Relaxed);
        let duration = started.elapsed();
        match outcome {
            Ok(value) => {
                if let Some(name) = &step.save_result_to {
                    variables.insert(name.clone(), value.clone());
                }
                self.reporter.attach(
                    "return value",
                    &serde_json::to_string_pretty(&value).unwrap_or_default(),
                    AttachmentType::Json,
                );
                (
                    StepReport {
                        description: step.description.clone(),
                        function: step.function.clone(),
                        passed: true,
                        attempts,
                        return_value: Some(value),
                        duration,
                        error: None,
                    },
                    None,
                )
            }
            Err(e) => {
                self.reporter
                    .attach("step error", &e.to_string(), AttachmentType::Text);
                (
                    StepReport {
                        description: step.description.clone(),
                        function: step.function.clone(),
                        passed: false,
                        attempts,
                        return_value: None,
                        duration,
                        error: Some(e.to_string()),
                    },
                    Some(e),
                )
            }
        }
    }

    /// Resolve inputs, look up the function, and run the invoke-and-assert
    /// cycle inside the retry controller
    async fn run_step_inner(
        &self,
        step: &TestStep,
        variables: &Map<String, Value>,
        invocations: &AtomicU32,
    ) -> Result<Value> {
        // Validated before the retry loop so a typo in a suite fails once
        // instead of retrying against a dispatch error.
        let assertion = AssertionType::parse(&step.assertion_type)?;

        let mut args = Vec::with_capacity(step.input_args.len());
        for arg in &step.input_args {
            args.push(resolve::resolve(arg, variables)?);
        }
        let mut kwargs = Map::new();
        for (key, value) in &step.input_kwargs {
            kwargs.insert(key.clone(), resolve::resolve(value, variables)?);
        }

        let function = self.registry.get(&step.function)?;

        self.reporter.attach(
            "input",
            &serde_json::to_string_pretty(&json!({
                "function": step.function,
                "args": args,
                "kwargs": kwargs,
            }))
            .unwrap_or_default(),
            AttachmentType::Json,
        );

        retry::run_with_retry(step.retry_policy(), || {
            invocations.fetch_add(1, Ordering::Relaxed);
            let function = Arc::clone(&function);
            let args = args.clone();
            let kwargs = kwargs.clone();
            async move {
                let value = function(args, kwargs).await?;
                check_expectation(step, assertion, &value)?;
                Ok(value)
            }
        })
        .await
    }
}

/// Assert on the raw result, or on the `expected_key` sub-value when the
/// step declares one. A step without an expected value performs no
/// comparison unless the assertion is a nullity check.
fn check_expectation(step: &TestStep, assertion: AssertionType, value: &Value) -> Result<()> {
    let actual = match &step.expected_key {
        Some(path) => resolve::extract(value, path)?,
        None => value.clone(),
    };
    match &step.expected_result {
        Some(expected) => assertion::assert_matches(&actual, expected, assertion),
        None if assertion.requires_expected() => Ok(()),
        None => assertion::assert_matches(&actual, &Value::Null, assertion),
    }
}
