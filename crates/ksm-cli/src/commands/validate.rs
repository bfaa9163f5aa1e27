//! Validate command - check a manifest against Kubernetes rules

use clap::Args;
use ksm_core::validate_secret;
use miette::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use super::{guard, load_secret};
use crate::GlobalArgs;
use crate::display::ValidationReport;
use crate::error::CliError;

#[derive(Args, Debug)]
#[command(after_help = "\
Checks the name and namespace against Kubernetes naming rules, data keys
against the allowed character set, and the data keys each well-known type
requires. Exits with status 2 when any error is found.")]
pub struct ValidateArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(_global: &GlobalArgs, args: ValidateArgs) -> Result<()> {
    let input = guard("--input", &args.input)?;
    let secret = load_secret(&input)?;

    let report = ValidationReport::new(validate_secret(&secret));
    tracing::debug!(issues = report.issues.len(), "validated secret");

    if args.json {
        let json = report.to_json(&input.display().to_string());
        let text = serde_json::to_string_pretty(&json)
            .map_err(|e| CliError::io("encode JSON", e.into()))?;
        writeln!(io::stdout().lock(), "{text}").map_err(|e| CliError::io("write stdout", e))?;
    } else {
        let mut stderr = io::stderr().lock();
        report
            .display(&mut stderr)
            .and_then(|()| report.print_summary(&mut stderr))
            .map_err(|e| CliError::io("write stderr", e))?;
    }

    verdict(&report, args.strict)?;
    Ok(())
}

/// Decide the exit status from the findings
fn verdict(report: &ValidationReport, strict: bool) -> crate::error::Result<()> {
    match report.summary() {
        (0, 0) => Ok(()),
        (0, warnings) if strict => Err(CliError::StrictWarnings { warnings }),
        (0, _) => Ok(()),
        (errors, _) => Err(CliError::ValidationFailed { errors }),
    }
}
