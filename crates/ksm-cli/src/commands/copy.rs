//! Copy command - clone a manifest under a new name and namespace

use clap::Args;
use ksm_core::Secret;
use miette::Result;
use std::path::PathBuf;

use super::{guard, guard_output, load_secret, status, write_secret};
use crate::GlobalArgs;

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest copy -i secret.yaml --name my-secret-copy -n staging -o staging-secret.yaml")]
pub struct CopyArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Name of the copy
    #[arg(short = 'N', long)]
    pub name: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(global: &GlobalArgs, args: CopyArgs) -> Result<()> {
    let input = guard("--input", &args.input)?;
    let output = guard_output(args.output.as_deref())?;

    let mut secret = load_secret(&input)?;
    retarget(&mut secret, &args.name, &global.namespace);
    write_secret(output.as_deref(), &secret)?;

    status(format_args!("Copied to {}/{}", secret.namespace(), secret.name()));
    Ok(())
}

/// Point `secret` at a new name and namespace; data, type and metadata maps are kept
fn retarget(secret: &mut Secret, name: &str, namespace: &str) {
    secret.metadata.name = name.to_string();
    secret.metadata.namespace = namespace.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retarget_keeps_data() {
        let mut secret = Secret::new("app", "default");
        secret.set_plain_value("A", "1");
        secret.metadata.labels.insert("team".into(), "x".into());

        retarget(&mut secret, "app-copy", "staging");
        assert_eq!(secret.name(), "app-copy");
        assert_eq!(secret.namespace(), "staging");
        assert_eq!(secret.plain_value("A").unwrap(), "1");
        assert_eq!(secret.metadata.labels["team"], "x");
    }
}
