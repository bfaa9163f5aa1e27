//! From-env command - build a Secret manifest from a `.env` file

use clap::Args;
use ksm_core::envfile::parse_env;
use ksm_core::{Secret, SecretType, validate_data_key};
use miette::Result;
use std::path::PathBuf;

use super::{apply_metadata, apply_set_values, guard, guard_output, write_secret};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
pub struct FromEnvArgs {
    /// Secret name
    #[arg(short = 'N', long)]
    pub name: String,

    /// .env file to read
    #[arg(short, long)]
    pub env_file: PathBuf,

    /// Secret type (default: Opaque)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub secret_type: Option<String>,

    /// Label to set; repeatable
    #[arg(short, long = "label", value_name = "KEY=VALUE")]
    pub label: Vec<String>,

    /// Annotation to set; repeatable
    #[arg(short, long = "annotation", value_name = "KEY=VALUE")]
    pub annotation: Vec<String>,

    /// Mark the secret as immutable
    #[arg(long)]
    pub immutable: bool,

    /// key=value pair overriding the env file; repeatable
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(global: &GlobalArgs, args: FromEnvArgs) -> Result<()> {
    let env_file = guard("--env-file", &args.env_file)?;
    let output = guard_output(args.output.as_deref())?;

    let content =
        std::fs::read_to_string(&env_file).map_err(|e| CliError::io("read --env-file", e))?;
    let secret = build(global, &args, &content)?;

    tracing::debug!(keys = secret.data.len(), "built secret from env file");
    write_secret(output.as_deref(), &secret)?;
    Ok(())
}

fn build(global: &GlobalArgs, args: &FromEnvArgs, content: &str) -> crate::error::Result<Secret> {
    let vars = parse_env(content).context("parse env file")?;

    let mut secret = Secret::new(&args.name, &global.namespace);
    if let Some(ty) = &args.secret_type {
        secret.secret_type = SecretType::parse(ty);
    }
    apply_metadata(&mut secret, &args.label, &args.annotation)?;
    if args.immutable {
        secret.immutable = Some(true);
    }

    for (key, value) in &vars {
        validate_data_key(key).context("env file")?;
        secret.set_plain_value(key, value);
    }

    apply_set_values(&mut secret, &args.set)?;
    Ok(secret)
}
