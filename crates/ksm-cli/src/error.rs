//! CLI error types with exit code handling
//!
//! Maps command failures to the exit codes in [`crate::exit_codes`].

use ksm_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid flag combination or flag value
    #[error("{message}")]
    #[diagnostic(code(ksm::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Validation reported error-severity findings
    #[error("validation failed with {errors} error(s)")]
    #[diagnostic(code(ksm::cli::validation))]
    ValidationFailed { errors: usize },

    /// `--strict` validation reported warnings
    #[error("validation failed with {warnings} warning(s) (--strict)")]
    #[diagnostic(code(ksm::cli::validation))]
    StrictWarnings { warnings: usize },

    /// Core failure with the step that triggered it
    #[error("{context}")]
    #[diagnostic(code(ksm::cli::core))]
    Context {
        context: String,
        #[source]
        source: CoreError,
    },

    /// Core failure without additional context
    #[error(transparent)]
    #[diagnostic(code(ksm::cli::core))]
    Core(#[from] CoreError),

    /// IO error outside the core library (temp files, editor)
    #[error("{context}: {source}")]
    #[diagnostic(code(ksm::cli::io))]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::ValidationFailed { .. } | CliError::StrictWarnings { .. } => {
                exit_codes::VALIDATION_ERROR
            }
            CliError::Context { source, .. } | CliError::Core(source) => core_exit_code(source),
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

fn core_exit_code(err: &CoreError) -> i32 {
    match err {
        CoreError::Io(_) | CoreError::ReadFile { .. } | CoreError::Lock { .. } => {
            exit_codes::IO_ERROR
        }
        _ => exit_codes::ERROR,
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Attach a step description to core results
pub trait CoreResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> CoreResultExt<T> for ksm_core::Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|source| CliError::Context {
            context: context.into(),
            source,
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| CliError::Context {
            context: f().into(),
            source,
        })
    }
}
