//! Shared utility functions for CLI commands

use std::collections::BTreeMap;

use crate::error::{CliError, Result};

/// Split `key=value` on the first `=`
///
/// The value may itself contain `=`.
pub fn split_key_value(kv: &str) -> Result<(&str, &str)> {
    kv.split_once('=').ok_or_else(|| {
        CliError::usage(format!("invalid key=value format: {kv:?} (missing '=')"))
    })
}

/// Parse repeated `key=value` flags into a map, later flags overriding earlier ones
pub fn parse_key_value_pairs<S: AsRef<str>>(
    pairs: &[S],
    flag: &str,
) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            split_key_value(pair.as_ref())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .map_err(|e| CliError::usage(format!("{flag}: {e}")))
        })
        .collect()
}
