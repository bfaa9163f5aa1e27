//! Secret validation
//!
//! Checks a manifest against Kubernetes naming rules and the data keys each
//! well-known Secret type needs. Every check runs; findings are returned as
//! [`Issue`] values and never short-circuit one another. Deciding whether the
//! findings amount to a failure is left to the caller.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{CoreError, Result};
use crate::secret::{
    BASIC_AUTH_PASSWORD_KEY, BASIC_AUTH_USERNAME_KEY, DOCKER_CONFIG_JSON_KEY, SERVICE_ACCOUNT_TOKEN_KEY,
    SSH_AUTH_PRIVATE_KEY, Secret, SecretType, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY,
};

const MAX_NAME_LENGTH: usize = 253;
const MAX_NAMESPACE_LENGTH: usize = 63;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9.\-]*[a-z0-9])?$").expect("valid regex"));

static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

static DATA_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-._a-zA-Z0-9]+$").expect("valid regex"));

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Run every check against `secret`
pub fn validate_secret(secret: &Secret) -> Vec<Issue> {
    let mut issues = Vec::new();
    issues.extend(check_name(secret.name()));
    issues.extend(check_namespace(secret.namespace()));
    issues.extend(check_data_keys(secret));
    issues.extend(check_type_requirements(secret));
    issues
}

/// Validate a single data key supplied on the command line or in an env file
pub fn validate_data_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CoreError::format("data key must not be empty"));
    }
    if !DATA_KEY_RE.is_match(key) {
        return Err(CoreError::InvalidDataKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn check_name(name: &str) -> Option<Issue> {
    if name.is_empty() {
        return Some(Issue::error("name must not be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Some(Issue::error(format!(
            "name {name:?} exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    if !NAME_RE.is_match(name) {
        return Some(Issue::error(format!(
            "name {name:?} is not a valid DNS subdomain (lowercase alphanumeric, hyphens, dots; must start and end with alphanumeric)"
        )));
    }
    None
}

fn check_namespace(namespace: &str) -> Option<Issue> {
    if namespace.is_empty() {
        return Some(Issue::error("namespace must not be empty"));
    }
    if namespace.len() > MAX_NAMESPACE_LENGTH {
        return Some(Issue::error(format!(
            "namespace {namespace:?} exceeds {MAX_NAMESPACE_LENGTH} characters"
        )));
    }
    if !NAMESPACE_RE.is_match(namespace) {
        return Some(Issue::error(format!(
            "namespace {namespace:?} is not a valid DNS label (lowercase alphanumeric and hyphens; must start and end with alphanumeric)"
        )));
    }
    None
}

fn check_data_keys(secret: &Secret) -> Vec<Issue> {
    let mut issues = Vec::new();
    if secret.data.is_empty() {
        issues.push(Issue::warning("secret has no data keys"));
    }
    for key in secret.keys() {
        if !DATA_KEY_RE.is_match(key) {
            issues.push(Issue::error(
                CoreError::InvalidDataKey {
                    key: key.to_string(),
                }
                .to_string(),
            ));
        }
    }
    issues
}

fn check_type_requirements(secret: &Secret) -> Vec<Issue> {
    let (required, recommended): (&[&str], &[&str]) = match secret.secret_type {
        SecretType::Tls => (&[TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY], &[]),
        SecretType::DockerConfigJson => (&[DOCKER_CONFIG_JSON_KEY], &[]),
        SecretType::BasicAuth => (&[], &[BASIC_AUTH_USERNAME_KEY, BASIC_AUTH_PASSWORD_KEY]),
        SecretType::SshAuth => (&[SSH_AUTH_PRIVATE_KEY], &[]),
        SecretType::ServiceAccountToken => (&[SERVICE_ACCOUNT_TOKEN_KEY], &[]),
        _ => (&[], &[]),
    };

    let ty = &secret.secret_type;
    let missing = |key: &&&str| !secret.contains_key(key);

    required
        .iter()
        .filter(missing)
        .map(|key| Issue::error(format!("type {ty} requires data key {key:?}")))
        .chain(
            recommended
                .iter()
                .filter(missing)
                .map(|key| Issue::warning(format!("type {ty} typically requires data key {key:?}"))),
        )
        .collect()
}
