//! Remove-entry command - drop one entry from a paired index-list

use clap::Args;
use ksm_core::{DEFAULT_SEPARATOR, Secret, with_exclusive_lock};
use miette::Result;
use std::path::PathBuf;

use super::{load_entries, load_secret, rmw_paths, status, store_entries, write_secret};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest remove-entry -i secret.yaml -K USERS -V PASSWORDS --key bob
  k8s-secret-manifest remove-entry -i secret.yaml -K USERS -V PASSWORDS --value bobpass")]
pub struct RemoveEntryArgs {
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

    /// Identifier of the entry to remove
    #[arg(short, long)]
    pub key: Option<String>,

    /// Value of the entry to remove (first match)
    #[arg(short, long)]
    pub value: Option<String>,

    /// Separator between list elements
    #[arg(short = 'S', long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,
}

/// Which entry to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector<'a> {
    Key(&'a str),
    Value(&'a str),
}

impl<'a> Selector<'a> {
    fn from_args(args: &'a RemoveEntryArgs) -> crate::error::Result<Self> {
        match (args.key.as_deref(), args.value.as_deref()) {
            (Some(key), None) => Ok(Self::Key(key)),
            (None, Some(value)) => Ok(Self::Value(value)),
            (None, None) => Err(CliError::usage_with_help(
                "one of --key or --value is required",
                "use --key to match the identifier or --value to match the first entry with that value",
            )),
            (Some(_), Some(_)) => Err(CliError::usage("--key and --value are mutually exclusive")),
        }
    }

    fn label(&self) -> &'a str {
        match *self {
            Self::Key(s) | Self::Value(s) => s,
        }
    }
}

pub fn run(_global: &GlobalArgs, args: RemoveEntryArgs) -> Result<()> {
    let selector = Selector::from_args(&args)?;
    let (input, output) = rmw_paths(&args.input, args.output.as_deref())?;

    with_exclusive_lock(Some(output.as_path()), || -> crate::error::Result<()> {
        let mut secret = load_secret(&input)?;
        remove(&mut secret, &args, selector)?;
        write_secret(Some(output.as_path()), &secret)
    })?;

    status(format_args!(
        "Removed entry {:?} from {}",
        selector.label(),
        output.display()
    ));
    Ok(())
}

fn remove(
    secret: &mut Secret,
    args: &RemoveEntryArgs,
    selector: Selector<'_>,
) -> crate::error::Result<()> {
    let entries = load_entries(secret, &args.entries_key, &args.entries_val, &args.separator)?;

    let updated = match selector {
        Selector::Key(key) => entries.remove(key),
        Selector::Value(value) => entries.remove_by_value(value),
    }
    .context("remove entry")?;

    store_entries(
        secret,
        &args.entries_key,
        &args.entries_val,
        &args.separator,
        &updated,
    )
}
