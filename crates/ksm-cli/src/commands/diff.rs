//! Diff command - compare the decoded contents of two manifests

use clap::Args;
use ksm_core::{Secret, SecretDiff};
use miette::Result;
use std::io;
use std::path::PathBuf;

use super::guard;
use crate::GlobalArgs;
use crate::display::DiffRenderer;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest diff --from old-secret.yaml --to new-secret.yaml
  k8s-secret-manifest diff -A old.yaml -B new.yaml --unchanged")]
pub struct DiffArgs {
    /// Original Secret manifest
    #[arg(short = 'A', long)]
    pub from: PathBuf,

    /// Updated Secret manifest
    #[arg(short = 'B', long)]
    pub to: PathBuf,

    /// Also print keys whose value did not change
    #[arg(long)]
    pub unchanged: bool,
}

pub fn run(_global: &GlobalArgs, args: DiffArgs) -> Result<()> {
    let from_path = guard("--from", &args.from)?;
    let to_path = guard("--to", &args.to)?;

    let from = Secret::from_file(&from_path).context("load --from")?;
    let to = Secret::from_file(&to_path).context("load --to")?;

    let diff = SecretDiff::between(&from, &to);
    tracing::debug!(summary = %diff.summary(), "computed diff");

    let from_label = from_path.display().to_string();
    let to_label = to_path.display().to_string();

    let mut renderer = DiffRenderer::new(io::stdout().lock(), args.unchanged);
    renderer
        .render((from_label.as_str(), &from), (to_label.as_str(), &to), &diff)
        .map_err(|e| CliError::io("write stdout", e))?;
    Ok(())
}
