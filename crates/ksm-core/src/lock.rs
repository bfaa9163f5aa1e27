//! Advisory exclusive locking for read-modify-write commands
//!
//! A sibling `<output>.lock` marker file is locked for the duration of one
//! load, mutate and write sequence, so concurrent invocations targeting the
//! same file serialize instead of losing each other's updates. The lock is
//! advisory: only processes that take it are serialized.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Held exclusive lock; released and its marker removed on drop
#[derive(Debug)]
pub struct ExclusiveLock {
    file: File,
    path: PathBuf,
}

impl ExclusiveLock {
    /// Block until the exclusive lock for `target` is held
    ///
    /// Returns `Ok(None)` when the platform does not support advisory locks;
    /// the caller then proceeds unlocked.
    pub fn acquire(target: &Path) -> Result<Option<Self>> {
        let path = lock_path(target);
        tracing::debug!(lock = %path.display(), "acquiring exclusive lock");
        loop {
            let file = open_marker(&path).map_err(|source| lock_error(&path, source))?;
            match file.lock_exclusive() {
                // marker was removed by the previous holder while we waited
                Ok(()) if !is_current_marker(&file, &path) => {
                    tracing::debug!(lock = %path.display(), "lock marker replaced, retrying");
                    continue;
                }
                Ok(()) => {
                    tracing::debug!(lock = %path.display(), "lock acquired");
                    return Ok(Some(Self { file, path }));
                }
                Err(err) if err.kind() == io::ErrorKind::Unsupported => {
                    tracing::warn!(
                        lock = %path.display(),
                        "advisory locking unsupported on this platform; continuing without a lock"
                    );
                    drop(file);
                    let _ = std::fs::remove_file(&path);
                    return Ok(None);
                }
                Err(source) => return Err(lock_error(&path, source)),
            }
        }
    }

    /// Path of the lock marker
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
        tracing::debug!(lock = %self.path.display(), "lock released");
    }
}

/// Run `f` while holding the exclusive lock for `target`
///
/// `None` means output goes to stdout; there is nothing to protect, so `f`
/// runs directly. The lock is released whether `f` succeeds or fails.
pub fn with_exclusive_lock<T, E, F>(target: Option<&Path>, f: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<CoreError>,
{
    let Some(target) = target else {
        return f();
    };

    let _guard = ExclusiveLock::acquire(target)?;
    f()
}

/// `<target>.lock`
pub fn lock_path(target: &Path) -> PathBuf {
    let mut os = target.as_os_str().to_owned();
    os.push(".lock");
    PathBuf::from(os)
}

fn lock_error(path: &Path, source: io::Error) -> CoreError {
    CoreError::Lock {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(unix)]
fn is_current_marker(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (file.metadata(), std::fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_current_marker(_file: &File, path: &Path) -> bool {
    path.exists()
}

fn open_marker(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
