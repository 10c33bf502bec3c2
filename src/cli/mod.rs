//! CLI command handling
//!
//! Dispatches CLI commands: loads suites, wires the function registry, runs
//! cases through the engine, and formats the summary.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::engine::{CaseRunner, CaseStatus, FunctionRegistry};
use crate::functions::http::{ApiClient, HttpFunctions};
use crate::functions::BuiltinFunctions;
use crate::report::ConsoleReporter;
use crate::suite;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run { path, tag, verbose } => run_suite(&path, tag.as_deref(), verbose).await,

        Commands::Validate { path } => {
            let suite = suite::load_suite(&path)?;
            println!(
                "{} {} ({} test case(s))",
                "✓".green(),
                path.display(),
                suite.test_cases.len()
            );
            Ok(())
        }

        Commands::Functions => {
            let registry = build_registry(&Config::load()?)?;
            for name in registry.list_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// Build the default registry: builtins plus the configured HTTP client
fn build_registry(config: &Config) -> Result<FunctionRegistry> {
    let mut registry = FunctionRegistry::new();
    registry.register_provider(&BuiltinFunctions);

    let client = Arc::new(ApiClient::new(&config.http)?);
    registry.register_provider(&HttpFunctions::new(client));

    Ok(registry)
}

/// Load and execute a suite, printing per-case results and a final tally
async fn run_suite(path: &Path, tag: Option<&str>, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let suite = suite::load_suite(path)?;
    let registry = Arc::new(build_registry(&config)?);
    let reporter = Arc::new(ConsoleReporter::new(verbose));
    let runner = CaseRunner::new(registry, reporter);

    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite
            .description
            .as_deref()
            .unwrap_or("unnamed suite")
            .white()
            .bold()
    );

    let cases: Vec<_> = suite
        .test_cases
        .iter()
        .filter(|case| tag.is_none() || case.tag.as_deref() == tag)
        .collect();
    if cases.is_empty() {
        return Err(Error::Config(format!(
            "no test cases matched tag filter '{}'",
            tag.unwrap_or_default()
        )));
    }

    let total = cases.len();
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut errored = 0usize;

    for case in cases {
        println!("\n{} {}", "Case:".cyan(), case.label());
        match runner.execute_test_case(case).await {
            Ok(report) if report.status == CaseStatus::Passed => passed += 1,
            Ok(_) => failed += 1,
            Err(e) => {
                errored += 1;
                eprintln!("  {} {}", "✗".red(), e);
            }
        }
    }

    println!(
        "\n{} {} passed, {} failed, {} errored ({} total)",
        if failed + errored == 0 {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        },
        passed,
        failed,
        errored,
        total
    );

    if failed + errored > 0 {
        Err(Error::SuiteFailed {
            failed: failed + errored,
            total,
        })
    } else {
        Ok(())
    }
}
