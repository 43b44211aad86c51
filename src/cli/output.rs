//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{DeployConfig, ValidationResult};
use crate::deployer::{DeployOutcome, DeployReport};
use crate::planner::{CrudPlan, OperationKind, SyncOperation};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Sync operation row for table display.
#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a sync plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &CrudPlan, detailed: bool) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan, detailed),
        }
    }

    fn format_plan_text(plan: &CrudPlan, detailed: bool) -> String {
        if plan.is_empty() {
            return format!("{} No changes required - remote is up to date.\n", "✓".green());
        }

        let mut output = String::from("\nSync plan\n\n");

        if detailed {
            output.push_str(&Self::operation_table(&plan.operations()));
            output.push('\n');
        }

        let _ = write!(
            output,
            "\nFolders: {} to create, {} to delete\nFiles: {} to create, {} to update, {} to delete\n",
            plan.folders.create.len().to_string().green(),
            plan.folders.delete.len().to_string().red(),
            plan.files.create.len().to_string().green(),
            plan.files.update.len().to_string().yellow(),
            plan.files.delete.len().to_string().red(),
        );

        if plan.has_ambiguities() {
            let _ = write!(output, "\n{} Ambiguous matches:\n", "⚠".yellow());
            for ambiguity in &plan.ambiguities {
                let _ = writeln!(
                    output,
                    "   - {} matches {}",
                    ambiguity.remote,
                    ambiguity.locals.join(", ")
                );
            }
        }

        output
    }

    /// Formats the report of a finished deploy.
    #[must_use]
    pub fn format_report(&self, report: &DeployReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!(
                    "{} Deployed {} ({}) in {:.2?}\n\n",
                    "✓".green(),
                    report.project,
                    report.target_type,
                    report.elapsed
                );

                match &report.outcome {
                    DeployOutcome::Synced(result) => {
                        let report = &result.report;
                        for kind in [
                            OperationKind::DeleteFile,
                            OperationKind::DeleteFolder,
                            OperationKind::UpdateFile,
                            OperationKind::CreateFolder,
                            OperationKind::CreateFile,
                        ] {
                            let _ = writeln!(output, "   {kind}: {}", report.count(kind));
                        }
                        if !report.skipped.is_empty() {
                            let _ = write!(output, "\n{} Skipped:\n", "⚠".yellow());
                            for operation in &report.skipped {
                                let _ = writeln!(output, "   - {operation}");
                            }
                        }
                    }
                    DeployOutcome::Uploaded {
                        created,
                        files,
                        archive_bytes,
                    } => {
                        let verb = if *created { "Created" } else { "Updated" };
                        let _ = writeln!(
                            output,
                            "   {verb} repository entry from {files} files ({archive_bytes} bytes)"
                        );
                    }
                    DeployOutcome::Commands { commands } => {
                        for command in commands {
                            let _ = writeln!(output, "   $ {}", command.dimmed());
                        }
                    }
                }

                output
            }
        }
    }

    /// Formats a validation result.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &DeployConfig,
        result: &ValidationResult,
        show_warnings: bool,
    ) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "project": config.metadata.name,
                    "type": config.deployer.target_type,
                    "sourcePath": config.deployer.source_path,
                    "valid": result.is_valid(),
                    "warnings": result.warnings,
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid!\n", "✓".green());

                if show_warnings && !result.warnings.is_empty() {
                    output.push_str("\nWarnings:\n");
                    for warning in &result.warnings {
                        let _ = writeln!(output, "  - {warning}");
                    }
                }

                output.push_str("\nConfiguration summary:\n");
                let _ = writeln!(output, "  Project: {}", config.metadata.name);
                let _ = writeln!(output, "  Type: {}", config.deployer.target_type);
                let _ = writeln!(output, "  Source: {}", config.deployer.source_path);
                if !config.deployer.connection.url.is_empty() {
                    let _ = writeln!(output, "  Target: {}", config.deployer.connection.url);
                }
                output
            }
        }
    }

    fn operation_table(operations: &[SyncOperation]) -> String {
        let rows: Vec<OperationRow> = operations
            .iter()
            .enumerate()
            .map(|(i, op)| OperationRow {
                index: i + 1,
                action: Self::format_kind(op.kind),
                path: op.path.clone(),
            })
            .collect();
        Table::new(rows).to_string()
    }

    /// Formats an operation kind with color.
    fn format_kind(kind: OperationKind) -> String {
        match kind {
            OperationKind::CreateFolder | OperationKind::CreateFile => {
                format!("+{kind}").green().to_string()
            }
            OperationKind::UpdateFile => format!("~{kind}").yellow().to_string(),
            OperationKind::DeleteFile | OperationKind::DeleteFolder => {
                format!("-{kind}").red().to_string()
            }
        }
    }
}
