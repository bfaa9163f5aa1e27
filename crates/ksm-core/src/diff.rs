//! Decoded comparison of two Secret manifests
//!
//! Data values are compared after base64 decoding, so the diff shows what
//! actually changed rather than encoded noise. Multi-line values (certificates,
//! keys, config blobs) additionally carry a line-level diff.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeSet;
use std::fmt;

use crate::secret::Secret;

/// Comparison of two manifests
#[derive(Debug, Clone, Serialize)]
pub struct SecretDiff {
    /// Changed top-level fields (name, namespace, type, immutable)
    pub metadata: Vec<FieldChange>,

    /// One entry per data key present in either manifest, sorted by key
    pub keys: Vec<KeyChange>,
}

impl SecretDiff {
    /// Compare `old` against `new`
    pub fn between(old: &Secret, new: &Secret) -> Self {
        let mut metadata = Vec::new();
        let mut field = |name: &'static str, a: String, b: String| {
            if a != b {
                metadata.push(FieldChange {
                    field: name,
                    old: a,
                    new: b,
                });
            }
        };
        field("name", old.name().to_string(), new.name().to_string());
        field("namespace", old.namespace().to_string(), new.namespace().to_string());
        field("type", old.secret_type.to_string(), new.secret_type.to_string());
        field(
            "immutable",
            old.is_immutable().to_string(),
            new.is_immutable().to_string(),
        );

        let all_keys: BTreeSet<&str> = old.keys().chain(new.keys()).collect();
        let keys = all_keys
            .into_iter()
            .map(|key| {
                let a = old.data.get(key).map(|v| String::from_utf8_lossy(v).into_owned());
                let b = new.data.get(key).map(|v| String::from_utf8_lossy(v).into_owned());
                KeyChange::new(key, a, b)
            })
            .collect();

        Self { metadata, keys }
    }

    /// Whether anything differs
    pub fn has_changes(&self) -> bool {
        !self.metadata.is_empty() || self.keys.iter().any(|k| k.change_type != ChangeType::Unchanged)
    }

    /// Key changes, skipping unchanged keys
    pub fn changed_keys(&self) -> impl Iterator<Item = &KeyChange> {
        self.keys
            .iter()
            .filter(|k| k.change_type != ChangeType::Unchanged)
    }

    /// Short human-readable summary
    pub fn summary(&self) -> String {
        let count = |t: ChangeType| self.keys.iter().filter(|k| k.change_type == t).count();
        let mut parts = Vec::new();

        if !self.metadata.is_empty() {
            parts.push(format!("{} metadata", self.metadata.len()));
        }
        for (t, label) in [
            (ChangeType::Added, "added"),
            (ChangeType::Modified, "modified"),
            (ChangeType::Removed, "removed"),
        ] {
            let n = count(t);
            if n > 0 {
                parts.push(format!("{n} {label}"));
            }
        }

        if parts.is_empty() {
            "no differences".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// A changed top-level field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

/// Type of data key change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
    Unchanged,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Added => write!(f, "added"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Removed => write!(f, "removed"),
            ChangeType::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Comparison of one data key
#[derive(Debug, Clone, Serialize)]
pub struct KeyChange {
    pub key: String,
    pub change_type: ChangeType,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl KeyChange {
    fn new(key: &str, old: Option<String>, new: Option<String>) -> Self {
        let change_type = match (&old, &new) {
            (Some(_), None) => ChangeType::Removed,
            (None, Some(_)) => ChangeType::Added,
            (Some(a), Some(b)) if a != b => ChangeType::Modified,
            _ => ChangeType::Unchanged,
        };
        Self {
            key: key.to_string(),
            change_type,
            old,
            new,
        }
    }

    /// Line-level diff, for modified values spanning more than one line
    pub fn line_diff(&self) -> Option<Vec<DiffLine>> {
        if self.change_type != ChangeType::Modified {
            return None;
        }
        let (old, new) = (self.old.as_deref()?, self.new.as_deref()?);
        if !old.trim_end().contains('\n') && !new.trim_end().contains('\n') {
            return None;
        }

        let diff = TextDiff::from_lines(old, new);
        let lines = diff
            .iter_all_changes()
            .map(|change| DiffLine {
                line_type: match change.tag() {
                    ChangeTag::Delete => LineType::Removed,
                    ChangeTag::Insert => LineType::Added,
                    ChangeTag::Equal => LineType::Context,
                },
                content: change.value().trim_end_matches(['\n', '\r']).to_string(),
            })
            .collect();

        Some(lines)
    }
}

/// A single line in a value diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
}

/// Type of diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Added,
    Removed,
    Context,
}
