//! Edit command - edit decoded values in `$EDITOR`
//!
//! The data is written as a `.env` file inside a private temporary directory,
//! the editor is run on it, and whatever comes back replaces the data map.
//! Metadata and type are left untouched.
//!
//! Values that are not UTF-8 cannot be shown as text. Each one is listed as a
//! marker comment instead and its bytes are carried over unchanged, unless
//! the edited file assigns the key or the marker line is deleted.

use clap::Args;
use ksm_core::envfile::{parse_rendered_env, render_env};
use ksm_core::{CoreError, Secret, validate_data_key, with_exclusive_lock};
use miette::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use super::{load_secret, rmw_paths, status, write_secret};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

const DEFAULT_EDITOR: &str = "vi";
const EDIT_FILE_NAME: &str = "secret.env";

#[derive(Args, Debug)]
#[command(after_help = "\
Opens the decoded values as KEY=value lines in $EDITOR (default: vi).
Saving replaces the secret's data; deleted lines remove keys.
Binary values are shown as comments and kept unless their line is deleted.")]
pub struct EditArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: overwrite input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(_global: &GlobalArgs, args: EditArgs) -> Result<()> {
    let (input, output) = rmw_paths(&args.input, args.output.as_deref())?;

    let (program, editor_args) = editor_command(std::env::var("EDITOR").ok());
    let editor = which::which(&program).map_err(|_| {
        CliError::from(CoreError::SubprocessNotFound {
            program: "editor".to_string(),
            path: program.clone(),
            hint: "set EDITOR to an installed editor".to_string(),
        })
    })?;

    with_exclusive_lock(Some(output.as_path()), || -> crate::error::Result<()> {
        let mut secret = load_secret(&input)?;

        let dir = TempDir::new().map_err(|e| CliError::io("create temp dir", e))?;
        let path = dir.path().join(EDIT_FILE_NAME);
        std::fs::write(&path, render(&secret))
            .map_err(|e| CliError::io("write temp file", e))?;

        launch(&editor, &editor_args, &path)?;

        let edited =
            std::fs::read_to_string(&path).map_err(|e| CliError::io("read edited file", e))?;
        replace_data(&mut secret, &edited)?;
        write_secret(Some(output.as_path()), &secret)
    })?;

    status(format_args!("Updated {}", output.display()));
    Ok(())
}

/// Split `$EDITOR` into program and leading arguments, falling back to `vi`
fn editor_command(raw: Option<String>) -> (String, Vec<String>) {
    let raw = raw.unwrap_or_default();
    let mut parts = raw.split_whitespace().map(String::from);
    match parts.next() {
        Some(program) => (program, parts.collect()),
        None => (DEFAULT_EDITOR.to_string(), Vec::new()),
    }
}

fn launch(editor: &Path, args: &[String], file: &Path) -> crate::error::Result<()> {
    tracing::debug!(editor = %editor.display(), ?args, "launching editor");

    let status = Command::new(editor)
        .args(args)
        .arg(file)
        .status()
        .map_err(|e| CliError::io("run editor", e))?;

    if !status.success() {
        return Err(CoreError::SubprocessFailed {
            program: "editor".to_string(),
            message: status.to_string(),
        }
        .into());
    }
    Ok(())
}

fn binary_marker(key: &str, len: usize) -> String {
    format!("# {key}: {len} byte(s) of binary data kept unchanged; delete this line to remove")
}

fn render(secret: &Secret) -> String {
    let mut text = BTreeMap::new();
    let mut out = String::new();
    for (key, value) in &secret.data {
        match std::str::from_utf8(value) {
            Ok(value) => {
                text.insert(key.as_str(), value);
            }
            Err(_) => {
                out.push_str(&binary_marker(key, value.len()));
                out.push('\n');
            }
        }
    }
    out.push_str(&render_env(&text));
    out
}

/// Replace the data map with the edited `.env` content
///
/// Keys are validated before anything is replaced. Binary values whose
/// marker survived and whose key was not assigned are kept.
fn replace_data(secret: &mut Secret, edited: &str) -> crate::error::Result<()> {
    let vars = parse_rendered_env(edited).context("parse edited file")?;
    for key in vars.keys() {
        validate_data_key(key).context("edited file")?;
    }

    let kept: Vec<(String, Vec<u8>)> = secret
        .data
        .iter()
        .filter(|(key, value)| {
            std::str::from_utf8(value).is_err()
                && !vars.contains_key(key.as_str())
                && edited
                    .lines()
                    .any(|line| line.trim() == binary_marker(key, value.len()))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    secret.data = vars
        .into_iter()
        .map(|(k, v)| (k, v.into_bytes()))
        .chain(kept)
        .collect();
    Ok(())
}
