//! CLI commands
//!
//! Every command takes the global options and its own clap `Args` struct.
//! Helpers below cover what several commands share: path guarding, loading
//! and writing manifests, `--set`/`--set-file` handling and the paired
//! index-list round trip.

pub mod add_entry;
pub mod copy;
pub mod diff;
pub mod edit;
pub mod export_env;
pub mod from_env;
pub mod generate;
pub mod list;
pub mod remove_entry;
pub mod rotate;
pub mod seal;
pub mod show;
pub mod update;
pub mod validate;

use ksm_core::{EntryList, Secret, safe_path, validate_data_key, write_output};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CliError, CoreResultExt, Result};
use crate::util::{parse_key_value_pairs, split_key_value};

/// Guard a user-supplied path
pub(crate) fn guard(flag: &str, path: &Path) -> Result<PathBuf> {
    Ok(safe_path(flag, path)?)
}

/// Guard an optional output path
pub(crate) fn guard_output(path: Option<&Path>) -> Result<Option<PathBuf>> {
    path.map(|p| guard("--output", p)).transpose()
}

/// Guard `--input` and resolve the read-modify-write target
///
/// Without `--output` the input file is rewritten in place.
pub(crate) fn rmw_paths(input: &Path, output: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let input = guard("--input", input)?;
    let output = match guard_output(output)? {
        Some(output) => output,
        None => input.clone(),
    };
    Ok((input, output))
}

pub(crate) fn load_secret(path: &Path) -> Result<Secret> {
    Secret::from_file(path).context("load secret")
}

/// Serialize `secret` to `path`, or stdout when `None`
pub(crate) fn write_secret(path: Option<&Path>, secret: &Secret) -> Result<()> {
    let yaml = secret.to_yaml().context("render secret")?;
    write_output(path, yaml.as_bytes()).context("write output")
}

/// Apply `--set KEY=value` flags
pub(crate) fn apply_set_values(secret: &mut Secret, sets: &[String]) -> Result<()> {
    for kv in sets {
        let (key, value) = split_key_value(kv)?;
        validate_data_key(key).context("--set")?;
        secret.set_plain_value(key, value);
    }
    Ok(())
}

/// Apply `--set-file KEY=path` flags; file contents become the value verbatim
pub(crate) fn apply_set_files(secret: &mut Secret, set_files: &[String]) -> Result<()> {
    for kf in set_files {
        let (key, path) = split_key_value(kf)
            .map_err(|e| CliError::usage(format!("--set-file: {e}")))?;
        validate_data_key(key).context("--set-file")?;
        let path = guard("--set-file", Path::new(path))?;
        let data = std::fs::read(&path)
            .map_err(|e| CliError::io(format!("--set-file {key}"), e))?;
        secret.set_value(key, data);
    }
    Ok(())
}

/// Merge `--label` / `--annotation` flags into the secret's metadata
pub(crate) fn apply_metadata(
    secret: &mut Secret,
    labels: &[String],
    annotations: &[String],
) -> Result<()> {
    secret
        .metadata
        .labels
        .extend(parse_key_value_pairs(labels, "--label")?);
    secret
        .metadata
        .annotations
        .extend(parse_key_value_pairs(annotations, "--annotation")?);
    Ok(())
}

/// Read a paired index-list; missing data keys read as an empty list
pub(crate) fn load_entries(
    secret: &Secret,
    entries_key: &str,
    entries_val: &str,
    sep: &str,
) -> Result<EntryList> {
    let keys = secret.plain_value_or_empty(entries_key);
    let values = secret.plain_value_or_empty(entries_val);
    EntryList::parse(&keys, &values, sep)
        .with_context(|| format!("parse entries from {entries_key:?} and {entries_val:?}"))
}

/// Write a paired index-list back to its two data keys
pub(crate) fn store_entries(
    secret: &mut Secret,
    entries_key: &str,
    entries_val: &str,
    sep: &str,
    entries: &EntryList,
) -> Result<()> {
    let (keys, values) = entries
        .serialize(sep)
        .with_context(|| format!("store entries in {entries_key:?} and {entries_val:?}"))?;
    secret.set_plain_value(entries_key, &keys);
    secret.set_plain_value(entries_val, &values);
    Ok(())
}

/// Data values decoded as text, keyed by data key
pub(crate) fn decoded_data(secret: &Secret) -> BTreeMap<&str, String> {
    secret
        .data
        .iter()
        .map(|(k, v)| (k.as_str(), String::from_utf8_lossy(v).into_owned()))
        .collect()
}

/// Print a status line to stderr
pub(crate) fn status(message: impl std::fmt::Display) {
    eprintln!("{message}");
}
