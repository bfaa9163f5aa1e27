//! Add-entry command - append or insert into a paired index-list

use clap::Args;
use ksm_core::{DEFAULT_SEPARATOR, Secret, with_exclusive_lock};
use miette::Result;
use std::path::PathBuf;

use super::{load_entries, load_secret, rmw_paths, status, store_entries, write_secret};
use crate::GlobalArgs;
use crate::error::CoreResultExt;

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest add-entry -i secret.yaml \\
    --entries-key PGPOOL_BACKEND_USERS --entries-val PGPOOL_BACKEND_PASSWORDS \\
    --key carol --value carolpass
  k8s-secret-manifest add-entry -i secret.yaml -K USERS -V PASSWORDS -k admin -v pw --index 0")]
pub struct AddEntryArgs {
    /// Input Secret manifest
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: overwrite input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Data key holding the identifier list
    #[arg(short = 'K', long)]
    pub entries_key: String,

    /// Data key holding the value list
    #[arg(short = 'V', long)]
    pub entries_val: String,

    /// Identifier of the new entry
    #[arg(short, long)]
    pub key: String,

    /// Value of the new entry
    #[arg(short, long)]
    pub value: String,

    /// Insert at this position instead of appending
    #[arg(short = 'x', long, allow_negative_numbers = true)]
    pub index: Option<isize>,

    /// Separator between list elements
    #[arg(short = 'S', long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,
}

pub fn run(_global: &GlobalArgs, args: AddEntryArgs) -> Result<()> {
    let (input, output) = rmw_paths(&args.input, args.output.as_deref())?;

    with_exclusive_lock(Some(output.as_path()), || -> crate::error::Result<()> {
        let mut secret = load_secret(&input)?;
        add(&mut secret, &args)?;
        write_secret(Some(output.as_path()), &secret)
    })?;

    status(format_args!(
        "Added entry {:?} to {}",
        args.key,
        output.display()
    ));
    Ok(())
}

fn add(secret: &mut Secret, args: &AddEntryArgs) -> crate::error::Result<()> {
    let entries = load_entries(secret, &args.entries_key, &args.entries_val, &args.separator)?;

    let updated = match args.index {
        Some(index) => entries.insert(index, &args.key, &args.value),
        None => entries.add(&args.key, &args.value),
    }
    .context("add entry")?;

    store_entries(
        secret,
        &args.entries_key,
        &args.entries_val,
        &args.separator,
        &updated,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(key: &str, index: Option<isize>) -> AddEntryArgs {
        AddEntryArgs {
            input: PathBuf::from("secret.yaml"),
            output: None,
            entries_key: "USERS".into(),
            entries_val: "PASSWORDS".into(),
            key: key.into(),
            value: format!("{key}-pw"),
            index,
            separator: DEFAULT_SEPARATOR.into(),
        }
    }

    fn secret() -> Secret {
        let mut s = Secret::new("pg", "default");
        s.set_plain_value("USERS", "alice;bob");
        s.set_plain_value("PASSWORDS", "a;b");
        s
    }

    #[test]
    fn test_append() {
        let mut s = secret();
        add(&mut s, &args("carol", None)).unwrap();
        assert_eq!(s.plain_value("USERS").unwrap(), "alice;bob;carol");
        assert_eq!(s.plain_value("PASSWORDS").unwrap(), "a;b;carol-pw");
    }

    #[test]
    fn test_insert_at_front() {
        let mut s = secret();
        add(&mut s, &args("admin", Some(0))).unwrap();
        assert_eq!(s.plain_value("USERS").unwrap(), "admin;alice;bob");
    }

    #[test]
    fn test_creates_missing_lists() {
        let mut s = Secret::new("pg", "default");
        add(&mut s, &args("alice", None)).unwrap();
        assert_eq!(s.plain_value("USERS").unwrap(), "alice");
        assert_eq!(s.plain_value("PASSWORDS").unwrap(), "alice-pw");
    }

    #[test]
    fn test_duplicate_and_out_of_range() {
        let mut s = secret();
        let err = add(&mut s, &args("alice", None)).unwrap_err();
        let source = std::error::Error::source(&err).map(ToString::to_string).unwrap();
        assert_eq!(source, "entry \"alice\" already exists");

        let err = add(&mut s, &args("zed", Some(5))).unwrap_err();
        let source = std::error::Error::source(&err).map(ToString::to_string).unwrap();
        assert_eq!(source, "index 5 out of range [0, 2]");

        assert!(add(&mut s, &args("zed", Some(-1))).is_err());
        assert_eq!(s.plain_value("USERS").unwrap(), "alice;bob");
    }

    #[test]
    fn test_value_with_separator_rejected() {
        let mut s = secret();
        let mut a = args("carol", None);
        a.value = "x;y".into();

        let err = add(&mut s, &a).unwrap_err();
        let source = std::error::Error::source(&err).map(ToString::to_string).unwrap();
        assert_eq!(source, "value of entry \"carol\" contains the separator \";\"");
        assert_eq!(s.plain_value("PASSWORDS").unwrap(), "a;b");

        // list is still loadable and accepts the next entry
        add(&mut s, &args("dave", None)).unwrap();
        assert_eq!(s.plain_value("USERS").unwrap(), "alice;bob;dave");
    }
}
