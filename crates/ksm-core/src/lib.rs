//! ksm-core - Core types and utilities for Kubernetes Secret manifest tooling
//!
//! This crate provides the building blocks used by the `k8s-secret-manifest` CLI:
//! - `Secret`: The v1 Secret manifest with decoded data values
//! - `EntryList`: Paired index-lists stored across two data keys
//! - `validate`: Naming and type-requirement checks
//! - `lock` / `paths` / `output`: Safe, serialized file updates
//! - `envfile`, `generate`, `diff`, `seal`: Command helpers

pub mod diff;
pub mod entries;
pub mod envfile;
pub mod error;
pub mod generate;
pub mod lock;
pub mod output;
pub mod paths;
pub mod seal;
pub mod secret;
pub mod validate;

pub use diff::{ChangeType, SecretDiff};
pub use entries::{DEFAULT_SEPARATOR, Entry, EntryList};
pub use error::{CoreError, Result};
pub use generate::{Charset, random_value};
pub use lock::with_exclusive_lock;
pub use output::write_output;
pub use paths::safe_path;
pub use seal::{SealOptions, Sealed, seal};
pub use secret::{Secret, SecretType};
pub use validate::{Issue, Severity, validate_data_key, validate_secret};
