//! Update command - change values, labels or annotations of a manifest

use clap::Args;
use ksm_core::{Secret, with_exclusive_lock};
use miette::Result;
use std::path::PathBuf;

use super::{apply_metadata, apply_set_files, apply_set_values, load_secret, rmw_paths, status, write_secret};
use crate::GlobalArgs;
use crate::error::CliError;

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest update -i secret.yaml --set API_KEY=newvalue
  k8s-secret-manifest update -i secret.yaml --delete-key OLD_KEY -o updated.yaml")]
pub struct UpdateArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: overwrite input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// key=value pair to add or overwrite; repeatable
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// key=filepath pair; file content becomes the value; repeatable
    #[arg(short = 'f', long = "set-file", value_name = "KEY=PATH")]
    pub set_file: Vec<String>,

    /// Data key to remove; repeatable
    #[arg(short, long = "delete-key", value_name = "KEY")]
    pub delete_key: Vec<String>,

    /// Label to add or overwrite; repeatable
    #[arg(short, long = "label", value_name = "KEY=VALUE")]
    pub label: Vec<String>,

    /// Annotation to add or overwrite; repeatable
    #[arg(short, long = "annotation", value_name = "KEY=VALUE")]
    pub annotation: Vec<String>,
}

pub fn run(_global: &GlobalArgs, args: UpdateArgs) -> Result<()> {
    let (input, output) = rmw_paths(&args.input, args.output.as_deref())?;

    with_exclusive_lock(Some(output.as_path()), || -> crate::error::Result<()> {
        let mut secret = load_secret(&input)?;
        apply(&mut secret, &args)?;
        write_secret(Some(output.as_path()), &secret)
    })?;

    status(format_args!("Updated {}", output.display()));
    Ok(())
}

fn apply(secret: &mut Secret, args: &UpdateArgs) -> crate::error::Result<()> {
    apply_set_values(secret, &args.set)?;
    apply_set_files(secret, &args.set_file)?;

    for key in &args.delete_key {
        if secret.remove_key(key).is_err() {
            return Err(CliError::usage(format!(
                "--delete-key {key:?}: key not found in secret data"
            )));
        }
    }

    apply_metadata(secret, &args.label, &args.annotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(set: &[&str], delete: &[&str]) -> UpdateArgs {
        UpdateArgs {
            input: PathBuf::from("secret.yaml"),
            output: None,
            set: set.iter().map(|s| s.to_string()).collect(),
            set_file: Vec::new(),
            delete_key: delete.iter().map(|s| s.to_string()).collect(),
            label: vec!["team=payments".into()],
            annotation: Vec::new(),
        }
    }

    #[test]
    fn test_set_and_delete() {
        let mut secret = Secret::new("app", "default");
        secret.set_plain_value("OLD", "x");
        secret.set_plain_value("KEEP", "k");

        apply(&mut secret, &args(&["KEEP=k2", "NEW=n"], &["OLD"])).unwrap();
        assert_eq!(secret.keys().collect::<Vec<_>>(), vec!["KEEP", "NEW"]);
        assert_eq!(secret.plain_value("KEEP").unwrap(), "k2");
        assert_eq!(secret.metadata.labels["team"], "payments");
    }

    #[test]
    fn test_delete_missing_key() {
        let mut secret = Secret::new("app", "default");
        let err = apply(&mut secret, &args(&[], &["NOPE"])).unwrap_err();
        assert_eq!(err.to_string(), "--delete-key \"NOPE\": key not found in secret data");
    }
}
