//! Reporting sink
//!
//! The engine hands structured results to a reporter; it never renders
//! reports itself. Reporters are observers only and must not influence
//! pass/fail outcomes, so every method is infallible.

use colored::Colorize;

use crate::engine::runner::{CaseReport, CaseStatus, StepReport};

/// Attachment content type hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentType {
    Text,
    Json,
}

/// Abstract reporting collaborator
pub trait Reporter: Send + Sync {
    /// A step is about to execute
    fn begin_step(&self, label: &str);

    /// Record an artifact against the current step (inputs, outputs,
    /// assertion detail)
    fn attach(&self, name: &str, content: &str, content_type: AttachmentType);

    /// A case finished; called exactly once per run, regardless of outcome
    fn case_finished(&self, report: &CaseReport);
}

/// Reporter that discards everything; used by library embedders and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn begin_step(&self, _label: &str) {}
    fn attach(&self, _name: &str, _content: &str, _content_type: AttachmentType) {}
    fn case_finished(&self, _report: &CaseReport) {}
}

/// Console reporter with colored per-step output
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn print_step_line(&self, phase: &str, step: &StepReport) {
        let mark = if step.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        let label = format!("{} ({}, {} attempt(s))", step.description, step.function, step.attempts);
        println!("  {} {}{}", mark, phase, label.dimmed());
        if let Some(error) = &step.error {
            println!("      {}", error.red());
        }
    }
}

impl Reporter for ConsoleReporter {
    fn begin_step(&self, label: &str) {
        if self.verbose {
            println!("  {} {}", "→".cyan(), label.dimmed());
        }
    }

    fn attach(&self, name: &str, content: &str, _content_type: AttachmentType) {
        if self.verbose {
            println!("    {}:", name.cyan());
            for line in content.lines() {
                println!("      {}", line.dimmed());
            }
        }
    }

    fn case_finished(&self, report: &CaseReport) {
        for step in &report.setup {
            self.print_step_line("[setup] ", step);
        }
        for step in &report.steps {
            self.print_step_line("", step);
        }
        for step in &report.teardown {
            self.print_step_line("[teardown] ", step);
        }
        for warning in &report.warnings {
            println!("  {} {}", "Warning:".yellow(), warning);
        }

        let status = match report.status {
            CaseStatus::Passed => "PASSED".green().bold(),
            CaseStatus::Failed => "FAILED".red().bold(),
            CaseStatus::Errored => "ERRORED".red().bold(),
        };
        println!(
            "  {} in {:.2}s",
            status,
            report.duration.as_secs_f64()
        );
        if let Some(error) = &report.error {
            println!("  {}", error.red());
        }
    }
}
