//! CLI command definitions
//!
//! Defines the clap commands for the caseflow CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a JSON test suite
    Run {
        /// Path to the JSON suite file
        path: PathBuf,

        /// Only run test cases carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Verbose output (step inputs, return values, attachments)
        #[arg(long, short)]
        verbose: bool,
    },

    /// Check that a suite file parses and passes schema validation
    Validate {
        /// Path to the JSON suite file
        path: PathBuf,
    },

    /// List the function names available to test steps
    Functions,
}
