//! Path-traversal guard for user-supplied paths
//!
//! Paths are normalised lexically, without touching the filesystem, so a
//! rejected path is rejected whether or not it exists.

use std::path::{Component, Path, PathBuf};

use crate::error::{CoreError, Result};

/// Normalise `path` and reject relative paths that climb above the current directory
///
/// `flag` names the option the path came from and is echoed in the error.
/// Absolute paths are accepted after normalisation.
pub fn safe_path(flag: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let escape = || CoreError::PathEscape {
        flag: flag.to_string(),
        path: path.display().to_string(),
    };

    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    let mut rooted = false;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                normalized.push(component.as_os_str());
                rooted = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !rooted {
                    return Err(escape());
                }
                // `..` at the root stays at the root
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }

    Ok(normalized)
}
