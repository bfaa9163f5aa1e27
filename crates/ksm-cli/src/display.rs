//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Validation findings with a pass/fail summary
//! - Decoded manifest diffs with change colors
//!
//! Styling goes through `console`, which drops colors when the stream is not
//! a terminal or `NO_COLOR` is set.

use console::style;
use ksm_core::diff::{ChangeType, DiffLine, KeyChange, LineType, SecretDiff};
use ksm_core::{Issue, Secret, Severity};
use std::io::{self, Write};

/// Validation findings for one manifest
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Write every finding, one per line
    pub fn display<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for issue in &self.issues {
            let label = match issue.severity {
                Severity::Error => style("error:").red().for_stderr(),
                Severity::Warning => style("warning:").yellow().for_stderr(),
            };
            writeln!(w, "{} {}", label, issue.message)?;
        }
        Ok(())
    }

    /// Get summary counts
    pub fn summary(&self) -> (usize, usize) {
        let errors = self.issues.iter().filter(|i| i.is_error()).count();
        (errors, self.issues.len() - errors)
    }

    /// Write the passing summary line; failures are reported as errors
    pub fn print_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self.summary() {
            (0, 0) => writeln!(w, "{}", style("validation passed").green().for_stderr()),
            (0, warnings) => writeln!(
                w,
                "{}",
                style(format!("validation passed with {warnings} warning(s)"))
                    .yellow()
                    .for_stderr()
            ),
            _ => Ok(()),
        }
    }

    /// Machine-readable form
    pub fn to_json(&self, input: &str) -> serde_json::Value {
        let (errors, warnings) = self.summary();
        serde_json::json!({
            "input": input,
            "valid": errors == 0,
            "errors": errors,
            "warnings": warnings,
            "issues": self.issues,
        })
    }
}

/// Renders a [`SecretDiff`] as `-`/`+` lines
pub struct DiffRenderer<W: Write> {
    writer: W,
    show_unchanged: bool,
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(writer: W, show_unchanged: bool) -> Self {
        Self {
            writer,
            show_unchanged,
        }
    }

    /// Render the header, metadata changes and per-key changes
    pub fn render(
        &mut self,
        from: (&str, &Secret),
        to: (&str, &Secret),
        diff: &SecretDiff,
    ) -> io::Result<()> {
        self.header("---", from.0, from.1)?;
        self.header("+++", to.0, to.1)?;

        for change in &diff.metadata {
            let line = format!("~ {}: {} → {}", change.field, change.old, change.new);
            let styled = if change.field == "name" {
                style(line).red()
            } else {
                style(line).yellow()
            };
            writeln!(self.writer, "{styled}")?;
        }

        for key in &diff.keys {
            self.key(key)?;
        }

        if !diff.has_changes() {
            writeln!(self.writer, "(no differences)")?;
        }
        Ok(())
    }

    fn header(&mut self, marker: &str, label: &str, secret: &Secret) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} {} ({}/{}  type: {})",
            marker,
            label,
            secret.namespace(),
            secret.name(),
            secret.secret_type
        )
    }

    fn key(&mut self, change: &KeyChange) -> io::Result<()> {
        let old = change.old.as_deref().unwrap_or_default();
        let new = change.new.as_deref().unwrap_or_default();

        match change.change_type {
            ChangeType::Removed => {
                writeln!(self.writer, "{}", style(format!("- {}={}", change.key, old)).red())
            }
            ChangeType::Added => {
                writeln!(self.writer, "{}", style(format!("+ {}={}", change.key, new)).green())
            }
            ChangeType::Modified => match change.line_diff() {
                Some(lines) => self.line_diff(&change.key, &lines),
                None => {
                    writeln!(self.writer, "{}", style(format!("- {}={}", change.key, old)).red())?;
                    writeln!(self.writer, "{}", style(format!("+ {}={}", change.key, new)).green())
                }
            },
            ChangeType::Unchanged if self.show_unchanged => {
                writeln!(self.writer, "  {}={}", change.key, old)
            }
            ChangeType::Unchanged => Ok(()),
        }
    }

    fn line_diff(&mut self, key: &str, lines: &[DiffLine]) -> io::Result<()> {
        writeln!(self.writer, "{}", style(format!("~ {key}:")).yellow())?;
        for line in lines {
            match line.line_type {
                LineType::Removed => {
                    writeln!(self.writer, "    {}", style(format!("- {}", line.content)).red())?
                }
                LineType::Added => {
                    writeln!(self.writer, "    {}", style(format!("+ {}", line.content)).green())?
                }
                LineType::Context => writeln!(self.writer, "      {}", line.content)?,
            }
        }
        Ok(())
    }
}
