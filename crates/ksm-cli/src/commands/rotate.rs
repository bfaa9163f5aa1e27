//! Rotate command - replace values with fresh random strings

use clap::Args;
use ksm_core::generate::DEFAULT_LENGTH;
use ksm_core::{Charset, Secret, random_value, with_exclusive_lock};
use miette::Result;
use std::path::PathBuf;

use super::{load_secret, rmw_paths, status, write_secret};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest rotate -i secret.yaml --key DB_PASSWORD
  k8s-secret-manifest rotate -i secret.yaml -k API_KEY -k TOKEN --length 64 --charset hex")]
pub struct RotateArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: overwrite input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Data key to rotate; repeatable
    #[arg(short, long = "key", value_name = "KEY", required = true)]
    pub key: Vec<String>,

    /// Length of generated values
    #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
    pub length: usize,

    /// Character set: alphanumeric, hex or base64url
    #[arg(short, long, default_value = "alphanumeric")]
    pub charset: Charset,
}

pub fn run(_global: &GlobalArgs, args: RotateArgs) -> Result<()> {
    let (input, output) = rmw_paths(&args.input, args.output.as_deref())?;

    let rotated = with_exclusive_lock(Some(output.as_path()), || -> crate::error::Result<_> {
        let mut secret = load_secret(&input)?;
        let rotated = rotate(&mut secret, &args.key, args.length, args.charset)?;
        write_secret(Some(output.as_path()), &secret)?;
        Ok(rotated)
    })?;

    for (key, value) in &rotated {
        status(format_args!("{key}={value}"));
    }
    status(format_args!(
        "Rotated {} key(s) in {}",
        rotated.len(),
        output.display()
    ));
    Ok(())
}

/// Replace every key in `keys` with a new value; nothing changes if a key is missing
fn rotate(
    secret: &mut Secret,
    keys: &[String],
    length: usize,
    charset: Charset,
) -> crate::error::Result<Vec<(String, String)>> {
    if let Some(missing) = keys.iter().find(|k| !secret.contains_key(k)) {
        return Err(CliError::usage(format!(
            "key {missing:?} not found in secret data"
        )));
    }

    let mut rotated = Vec::with_capacity(keys.len());
    for key in keys {
        let value = random_value(length, charset).context("--length")?;
        secret.set_plain_value(key.as_str(), &value);
        rotated.push((key.clone(), value));
    }

    tracing::debug!(count = rotated.len(), %charset, length, "rotated keys");
    Ok(rotated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Secret {
        let mut s = Secret::new("app", "default");
        s.set_plain_value("DB_PASSWORD", "old");
        s.set_plain_value("USER", "admin");
        s
    }

    #[test]
    fn test_rotate_only_named_keys() {
        let mut s = secret();
        let rotated = rotate(&mut s, &["DB_PASSWORD".into()], 16, Charset::Hex).unwrap();

        assert_eq!(rotated.len(), 1);
        let value = s.plain_value("DB_PASSWORD").unwrap();
        assert_eq!(value, rotated[0].1);
        assert_eq!(value.len(), 16);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(s.plain_value("USER").unwrap(), "admin");
    }

    #[test]
    fn test_rotate_missing_key_changes_nothing() {
        let mut s = secret();
        let err = rotate(&mut s, &["DB_PASSWORD".into(), "NOPE".into()], 16, Charset::Hex)
            .unwrap_err();
        assert_eq!(err.to_string(), "key \"NOPE\" not found in secret data");
        assert_eq!(s.plain_value("DB_PASSWORD").unwrap(), "old");
    }

    #[test]
    fn test_rotate_length_limits() {
        let mut s = secret();
        let err = rotate(&mut s, &["USER".into()], 4097, Charset::Alphanumeric).unwrap_err();
        let source = std::error::Error::source(&err).map(ToString::to_string).unwrap();
        assert_eq!(source, "length 4097 exceeds maximum of 4096");

        assert!(rotate(&mut s, &["USER".into()], 0, Charset::Alphanumeric).is_err());
    }
}
