//! `.env` file codec
//!
//! Reading accepts the common dotenv dialect: `KEY=value` lines, blank lines
//! and `#` comments skipped, an optional `export ` prefix, and values wrapped
//! in matching single or double quotes. Writing emits sorted `KEY=value`
//! lines, double-quoting any value a shell or dotenv loader would misread.
//!
//! [`parse_env`] only strips the quotes, so backslashes in user files are
//! kept as written. [`parse_rendered_env`] is the inverse of [`render_env`]:
//! inside double quotes `\\`, `\"`, `\n` and `\r` are escapes, which lets
//! multi-line values survive a render and parse cycle.

use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// Characters that force a value to be quoted
const NEEDS_QUOTING: &[char] = &[' ', '\t', '\n', '\r', '"', '\'', '#', '$', '\\', '=', ';', ','];

/// Parse `.env` content into keys and values, in file order
///
/// A key appearing twice keeps its first position and its last value.
pub fn parse_env(content: &str) -> Result<IndexMap<String, String>> {
    parse_lines(content, false)
}

/// Parse content produced by [`render_env`], resolving its escapes
pub fn parse_rendered_env(content: &str) -> Result<IndexMap<String, String>> {
    parse_lines(content, true)
}

fn parse_lines(content: &str, escapes: bool) -> Result<IndexMap<String, String>> {
    let mut vars = IndexMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=').ok_or_else(|| {
            CoreError::format(format!("line {line_num}: expected KEY=value, got {line:?}"))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(CoreError::format(format!("line {line_num}: empty key")));
        }

        vars.insert(key.to_string(), unquote(value, escapes));
    }

    Ok(vars)
}

/// Render sorted `KEY=value` lines
pub fn render_env<K, V>(vars: &BTreeMap<K, V>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    vars.iter()
        .map(|(k, v)| format!("{}={}\n", k.as_ref(), quote(v.as_ref())))
        .collect()
}

/// Quote `value` if it contains characters with special meaning
pub fn quote(value: &str) -> String {
    if !value.contains(NEEDS_QUOTING) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(value: &str, escapes: bool) -> String {
    if value.len() >= 2 {
        if let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            return if escapes {
                unescape(inner)
            } else {
                inner.to_string()
            };
        }
        if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
            return inner.to_string();
        }
    }
    value.to_string()
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
