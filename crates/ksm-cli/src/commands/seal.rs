//! Seal command - encrypt a manifest into a SealedSecret with kubeseal

use clap::Args;
use ksm_core::seal::{DEFAULT_CONTROLLER_NAME, DEFAULT_CONTROLLER_NAMESPACE};
use ksm_core::{SealOptions, seal, write_output};
use miette::Result;
use std::path::PathBuf;

use super::{guard, guard_output, status};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest seal -i secret.yaml -o sealed.yaml
  k8s-secret-manifest seal -i secret.yaml --cert pub-cert.pem --scope namespace-wide")]
pub struct SealArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sealed-secrets controller name
    #[arg(short = 'c', long, default_value = DEFAULT_CONTROLLER_NAME)]
    pub controller_name: String,

    /// Sealed-secrets controller namespace
    #[arg(short = 'C', long, default_value = DEFAULT_CONTROLLER_NAMESPACE)]
    pub controller_namespace: String,

    /// Public certificate for offline sealing
    #[arg(short = 'r', long)]
    pub cert: Option<PathBuf>,

    /// Sealing scope: strict, namespace-wide or cluster-wide
    #[arg(short, long)]
    pub scope: Option<String>,
}

pub fn run(global: &GlobalArgs, args: SealArgs) -> Result<()> {
    let input = guard("--input", &args.input)?;
    let output = guard_output(args.output.as_deref())?;
    let cert = args.cert.as_deref().map(|c| guard("--cert", c)).transpose()?;

    let manifest = std::fs::read(&input).map_err(|e| CliError::io("read --input", e))?;

    let opts = SealOptions {
        kubeseal_path: global.kubeseal_path.clone(),
        controller_name: args.controller_name,
        controller_namespace: args.controller_namespace,
        cert,
        scope: args.scope,
    };
    let sealed = seal(&manifest, &opts).context("seal")?;

    if !sealed.warnings.trim().is_empty() {
        eprint!("{}", sealed.warnings);
    }
    write_output(output.as_deref(), &sealed.manifest).context("write output")?;

    status("Sealed successfully");
    Ok(())
}
