//! Export-env command - write decoded Secret values as a `.env` file

use clap::Args;
use ksm_core::envfile::render_env;
use ksm_core::{Secret, write_output};
use miette::Result;
use std::path::PathBuf;

use super::{decoded_data, guard, guard_output, load_secret};
use crate::GlobalArgs;
use crate::error::CoreResultExt;

#[derive(Args, Debug)]
pub struct ExportEnvArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(_global: &GlobalArgs, args: ExportEnvArgs) -> Result<()> {
    let input = guard("--input", &args.input)?;
    let output = guard_output(args.output.as_deref())?;

    let secret = load_secret(&input)?;
    write_output(output.as_deref(), render(&secret).as_bytes()).context("write output")?;
    Ok(())
}

fn render(secret: &Secret) -> String {
    render_env(&decoded_data(secret))
}
