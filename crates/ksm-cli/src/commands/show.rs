//! Show command - print decoded values of a manifest

use clap::Args;
use ksm_core::Secret;
use miette::Result;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use super::{decoded_data, guard, load_secret};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest show -i secret.yaml
  k8s-secret-manifest show -i secret.yaml --key API_KEY")]
pub struct ShowArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print only the value of this key
    #[arg(short, long)]
    pub key: Option<String>,
}

pub fn run(_global: &GlobalArgs, args: ShowArgs) -> Result<()> {
    let input = guard("--input", &args.input)?;
    let secret = load_secret(&input)?;

    let mut stdout = io::stdout().lock();
    let written = match &args.key {
        Some(key) => {
            let value = secret.plain_value(key).context("--key")?;
            writeln!(stdout, "{value}")
        }
        None => render(&mut stdout, &secret),
    };
    written.map_err(|e| CliError::io("write stdout", e))?;
    Ok(())
}

fn render<W: Write>(w: &mut W, secret: &Secret) -> io::Result<()> {
    writeln!(w, "Secret: {}/{}", secret.namespace(), secret.name())?;
    writeln!(w, "  type: {}", secret.secret_type)?;
    if secret.is_immutable() {
        writeln!(w, "  immutable: true")?;
    }

    section(w, "labels", &secret.metadata.labels)?;
    section(w, "annotations", &secret.metadata.annotations)?;

    section(w, "data", &decoded_data(secret))
}

fn section<W, K, V>(w: &mut W, title: &str, map: &BTreeMap<K, V>) -> io::Result<()>
where
    W: Write,
    K: std::fmt::Display,
    V: std::fmt::Display,
{
    if map.is_empty() {
        return Ok(());
    }
    writeln!(w, "  {title}:")?;
    for (k, v) in map {
        writeln!(w, "    {k}: {v}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_full() {
        let mut secret = Secret::new("app", "prod");
        secret.immutable = Some(true);
        secret.metadata.labels.insert("team".into(), "payments".into());
        secret.set_plain_value("PASSWORD", "hunter2");
        secret.set_plain_value("API_KEY", "abc");

        let mut out = Vec::new();
        render(&mut out, &secret).unwrap();
        insta::assert_snapshot!(String::from_utf8(out).unwrap().trim_end(), @r"
        Secret: prod/app
          type: Opaque
          immutable: true
          labels:
            team: payments
          data:
            API_KEY: abc
            PASSWORD: hunter2
        ");
    }

    #[test]
    fn test_show_empty_sections_omitted() {
        let secret = Secret::new("bare", "default");
        let mut out = Vec::new();
        render(&mut out, &secret).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Secret: default/bare\n  type: Opaque\n");
    }
}
