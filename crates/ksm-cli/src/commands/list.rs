//! List command - print the data keys of a manifest

use clap::Args;
use ksm_core::Secret;
use miette::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use super::{guard, load_secret};
use crate::GlobalArgs;
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,
}

pub fn run(_global: &GlobalArgs, args: ListArgs) -> Result<()> {
    let input = guard("--input", &args.input)?;
    let secret = load_secret(&input)?;

    let mut stdout = io::stdout().lock();
    render(&mut stdout, &secret).map_err(|e| CliError::io("write stdout", e))?;
    Ok(())
}

fn render<W: Write>(w: &mut W, secret: &Secret) -> io::Result<()> {
    writeln!(
        w,
        "Secret: {}/{}  type: {}  ({} key(s))",
        secret.namespace(),
        secret.name(),
        secret.secret_type,
        secret.data.len()
    )?;
    for key in secret.keys() {
        writeln!(w, "  {key}")?;
    }
    Ok(())
}
