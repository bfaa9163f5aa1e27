//! Sealing through the external `kubeseal` binary
//!
//! The plain manifest is piped to kubeseal's stdin and the sealed manifest is
//! read back from its stdout. Nothing is written to disk here.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{CoreError, Result};

const PROGRAM: &str = "kubeseal";
const INSTALL_HINT: &str =
    "install it or set --kubeseal-path (https://github.com/bitnami-labs/sealed-secrets#installation)";

pub const DEFAULT_CONTROLLER_NAME: &str = "sealed-secrets-controller";
pub const DEFAULT_CONTROLLER_NAMESPACE: &str = "kube-system";

/// kubeseal invocation options
#[derive(Debug, Clone)]
pub struct SealOptions {
    pub kubeseal_path: PathBuf,
    pub controller_name: String,
    pub controller_namespace: String,
    /// Public certificate for offline sealing
    pub cert: Option<PathBuf>,
    /// strict, namespace-wide or cluster-wide
    pub scope: Option<String>,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            kubeseal_path: PathBuf::from(PROGRAM),
            controller_name: DEFAULT_CONTROLLER_NAME.to_string(),
            controller_namespace: DEFAULT_CONTROLLER_NAMESPACE.to_string(),
            cert: None,
            scope: None,
        }
    }
}

impl SealOptions {
    /// Arguments passed to kubeseal
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            "yaml".to_string(),
            "--controller-name".to_string(),
            self.controller_name.clone(),
            "--controller-namespace".to_string(),
            self.controller_namespace.clone(),
        ];
        if let Some(scope) = self.scope.as_deref().filter(|s| !s.is_empty()) {
            args.push("--scope".to_string());
            args.push(scope.to_string());
        }
        if let Some(cert) = &self.cert {
            args.push("--cert".to_string());
            args.push(cert.display().to_string());
        }
        args
    }
}

/// Output of a successful seal
#[derive(Debug, Clone)]
pub struct Sealed {
    /// Sealed manifest YAML
    pub manifest: Vec<u8>,
    /// Anything kubeseal wrote to stderr
    pub warnings: String,
}

/// Seal `manifest` with kubeseal
pub fn seal(manifest: &[u8], opts: &SealOptions) -> Result<Sealed> {
    let args = opts.args();
    tracing::debug!(program = %opts.kubeseal_path.display(), ?args, "running kubeseal");

    let mut child = Command::new(&opts.kubeseal_path)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| spawn_error(&opts.kubeseal_path, err))?;

    // stdin is fed from a thread; kubeseal may fill stdout before draining it
    let stdin = child.stdin.take();
    let input = manifest.to_vec();
    let writer = thread::spawn(move || -> io::Result<()> {
        if let Some(mut stdin) = stdin {
            stdin.write_all(&input)?;
        }
        Ok(())
    });

    let output = child.wait_with_output()?;
    let write_result = writer
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let message = if stderr.trim().is_empty() {
            output.status.to_string()
        } else {
            stderr.trim_end().to_string()
        };
        return Err(CoreError::SubprocessFailed {
            program: PROGRAM.to_string(),
            message,
        });
    }

    // kubeseal may exit before reading all of stdin; only a failed exit matters
    if let Err(err) = write_result {
        tracing::debug!(error = %err, "kubeseal closed stdin early");
    }

    if output.stdout.is_empty() {
        return Err(CoreError::SubprocessFailed {
            program: PROGRAM.to_string(),
            message: "produced no output".to_string(),
        });
    }

    Ok(Sealed {
        manifest: output.stdout,
        warnings: stderr,
    })
}

fn spawn_error(path: &Path, err: io::Error) -> CoreError {
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::SubprocessNotFound {
            program: PROGRAM.to_string(),
            path: path.display().to_string(),
            hint: INSTALL_HINT.to_string(),
        }
    } else {
        CoreError::SubprocessFailed {
            program: PROGRAM.to_string(),
            message: err.to_string(),
        }
    }
}
