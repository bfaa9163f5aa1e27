//! Output sink for rendered manifests and env files

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Write `contents` to `path`, or to stdout when `path` is `None`
///
/// File writes go through a temporary file in the target's directory that is
/// renamed over the target, so readers never observe a truncated file. New
/// files are created with owner-only permissions.
pub fn write_output(path: Option<&Path>, contents: &[u8]) -> Result<()> {
    let Some(path) = path else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(contents)?;
        stdout.flush()?;
        return Ok(());
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}
