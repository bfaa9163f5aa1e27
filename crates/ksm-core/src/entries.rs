//! Paired index-list engine
//!
//! A paired index-list is stored as two data keys of a Secret whose
//! plain-text values are separator-joined lists. Entries are matched by
//! position only:
//!
//! ```text
//! BACKEND_USERS:     alice;bob;carol
//! BACKEND_PASSWORDS: pass1;pass2;pass3
//! ```
//!
//! Index 0 of the key list pairs with index 0 of the value list, and so on.
//! Every mutation returns a new [`EntryList`]; the receiver is never touched,
//! so a failed mutation leaves nothing half-applied.

use crate::error::{CoreError, Result};

/// Default separator between list elements
pub const DEFAULT_SEPARATOR: &str = ";";

/// One key/value pair from a paired index-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse a `key:value` command-line entry
    ///
    /// The first `:` is the delimiter, so values may themselves contain colons.
    pub fn parse_flag(flag: &str) -> Result<Self> {
        let (key, value) = flag.split_once(':').ok_or_else(|| {
            CoreError::format(format!(
                "invalid --entry {:?}: expected format key:value",
                flag
            ))
        })?;

        if key.is_empty() {
            return Err(CoreError::format(format!(
                "invalid --entry {:?}: key must not be empty",
                flag
            )));
        }

        Ok(Self::new(key, value))
    }
}

/// Ordered sequence of entries with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from repeated `key:value` flags, rejecting duplicate keys
    pub fn from_flags<S: AsRef<str>>(flags: &[S]) -> Result<Self> {
        let mut list = Self::new();
        for flag in flags {
            let entry = Entry::parse_flag(flag.as_ref())?;
            if list.contains_key(&entry.key) {
                return Err(CoreError::DuplicateKey { key: entry.key });
            }
            list.entries.push(entry);
        }
        Ok(list)
    }

    /// Decode the two plain-text list values into entries
    ///
    /// Tokens are trimmed and tokens that end up empty are dropped on each
    /// side independently, so stray leading, trailing or doubled separators
    /// do not create entries.
    pub fn parse(keys_text: &str, values_text: &str, sep: &str) -> Result<Self> {
        if sep.is_empty() {
            return Err(CoreError::format("separator must not be empty"));
        }

        let keys = split_trimmed(keys_text, sep);
        let values = split_trimmed(values_text, sep);

        if keys.len() != values.len() {
            // A key list with a hole that lines up with a real value is
            // reported as the hole rather than as a count mismatch.
            if let Some(index) = key_hole(keys_text, values_text, sep) {
                return Err(CoreError::EmptyKey { index });
            }
            return Err(CoreError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut entries = Vec::with_capacity(keys.len());
        for (index, (key, value)) in keys.into_iter().zip(values).enumerate() {
            if key.is_empty() {
                return Err(CoreError::EmptyKey { index });
            }
            entries.push(Entry::new(key, value));
        }

        Ok(Self { entries })
    }

    /// Encode entries back into the two separator-joined strings
    ///
    /// A key or value containing `sep` is rejected, since it would split into
    /// extra tokens on the next parse. Empty values are written as empty
    /// tokens. They are not filtered here, which means a later
    /// [`EntryList::parse`] drops them again.
    pub fn serialize(&self, sep: &str) -> Result<(String, String)> {
        if sep.is_empty() {
            return Err(CoreError::format("separator must not be empty"));
        }
        for entry in &self.entries {
            if entry.key.contains(sep) {
                return Err(CoreError::format(format!(
                    "entry key {:?} contains the separator {:?}",
                    entry.key, sep
                )));
            }
            if entry.value.contains(sep) {
                return Err(CoreError::format(format!(
                    "value of entry {:?} contains the separator {:?}",
                    entry.key, sep
                )));
            }
        }

        let keys: Vec<&str> = self.entries.iter().map(|e| e.key.as_str()).collect();
        let values: Vec<&str> = self.entries.iter().map(|e| e.value.as_str()).collect();
        Ok((keys.join(sep), values.join(sep)))
    }

    /// Append a new entry
    pub fn add(&self, key: &str, value: &str) -> Result<Self> {
        self.check_new_key(key, self.entries.len())?;
        let mut entries = self.entries.clone();
        entries.push(Entry::new(key, value));
        Ok(Self { entries })
    }

    /// Insert a new entry at `index`, shifting later entries back
    ///
    /// `0` prepends and `len()` appends; anything else, including negative
    /// indices, is out of range.
    pub fn insert(&self, index: isize, key: &str, value: &str) -> Result<Self> {
        let len = self.entries.len();
        let position = usize::try_from(index)
            .ok()
            .filter(|&i| i <= len)
            .ok_or(CoreError::IndexOutOfRange { index, len })?;

        self.check_new_key(key, position)?;

        let mut entries = Vec::with_capacity(len + 1);
        entries.extend_from_slice(&self.entries[..position]);
        entries.push(Entry::new(key, value));
        entries.extend_from_slice(&self.entries[position..]);
        Ok(Self { entries })
    }

    /// Remove the entry with this exact key
    pub fn remove(&self, key: &str) -> Result<Self> {
        if !self.contains_key(key) {
            return Err(CoreError::not_found("entry with key", key));
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.key != key)
            .cloned()
            .collect();
        Ok(Self { entries })
    }

    /// Remove the first entry whose value matches exactly
    pub fn remove_by_value(&self, value: &str) -> Result<Self> {
        let position = self
            .entries
            .iter()
            .position(|e| e.value == value)
            .ok_or_else(|| CoreError::not_found("entry with value", value))?;

        let mut entries = self.entries.clone();
        entries.remove(position);
        Ok(Self { entries })
    }

    /// Keys in list order
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    fn check_new_key(&self, key: &str, index: usize) -> Result<()> {
        if key.is_empty() {
            return Err(CoreError::EmptyKey { index });
        }
        if self.contains_key(key) {
            return Err(CoreError::DuplicateKey {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl From<Vec<Entry>> for EntryList {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Split on `sep`, trim every token and drop the empty ones
fn split_trimmed<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(sep)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Index of the first empty key token paired with a non-empty value token,
/// when both raw lists have the same number of tokens
fn key_hole(keys_text: &str, values_text: &str, sep: &str) -> Option<usize> {
    let keys: Vec<&str> = keys_text.split(sep).map(str::trim).collect();
    let values: Vec<&str> = values_text.split(sep).map(str::trim).collect();
    if keys.len() != values.len() {
        return None;
    }
    keys.iter()
        .zip(&values)
        .position(|(key, value)| key.is_empty() && !value.is_empty())
}
