//! Kubernetes Secret manifest (v1/Secret)
//!
//! Values are kept as raw bytes in memory; base64 encoding of the `data:`
//! field happens only at the YAML boundary. The data, labels and annotations
//! maps are always present: `null` or missing fields load as empty maps, so
//! callers never need to distinguish "absent" from "empty".

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{CoreError, Result};

pub const API_VERSION: &str = "v1";
pub const KIND: &str = "Secret";

/// Data key for a TLS certificate
pub const TLS_CERT_KEY: &str = "tls.crt";
/// Data key for a TLS private key
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";
/// Data key holding a docker `config.json` blob
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";
pub const SSH_AUTH_PRIVATE_KEY: &str = "ssh-privatekey";
pub const SERVICE_ACCOUNT_TOKEN_KEY: &str = "token";
pub const BASIC_AUTH_USERNAME_KEY: &str = "username";
pub const BASIC_AUTH_PASSWORD_KEY: &str = "password";

// =============================================================================
// SECRET TYPE
// =============================================================================

/// Secret `type` field
///
/// Well-known Kubernetes types get their own variant; anything else is kept
/// verbatim so it round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecretType {
    #[default]
    Opaque,
    ServiceAccountToken,
    Dockercfg,
    DockerConfigJson,
    BasicAuth,
    SshAuth,
    Tls,
    BootstrapToken,
    Other(String),
}

impl SecretType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opaque => "Opaque",
            Self::ServiceAccountToken => "kubernetes.io/service-account-token",
            Self::Dockercfg => "kubernetes.io/dockercfg",
            Self::DockerConfigJson => "kubernetes.io/dockerconfigjson",
            Self::BasicAuth => "kubernetes.io/basic-auth",
            Self::SshAuth => "kubernetes.io/ssh-auth",
            Self::Tls => "kubernetes.io/tls",
            Self::BootstrapToken => "bootstrap.kubernetes.io/token",
            Self::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Opaque" => Self::Opaque,
            "kubernetes.io/service-account-token" => Self::ServiceAccountToken,
            "kubernetes.io/dockercfg" => Self::Dockercfg,
            "kubernetes.io/dockerconfigjson" => Self::DockerConfigJson,
            "kubernetes.io/basic-auth" => Self::BasicAuth,
            "kubernetes.io/ssh-auth" => Self::SshAuth,
            "kubernetes.io/tls" => Self::Tls,
            "bootstrap.kubernetes.io/token" => Self::BootstrapToken,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for SecretType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<SecretType> for String {
    fn from(t: SecretType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SECRET
// =============================================================================

/// Object metadata subset used by Secret manifests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub annotations: BTreeMap<String, String>,
}

/// A Kubernetes Secret resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,

    #[serde(rename = "type", default)]
    pub secret_type: SecretType,

    /// Decoded data values, keyed by data key
    #[serde(default, with = "base64_data", skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    /// Create an empty Opaque secret
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..Default::default()
            },
            immutable: None,
            secret_type: SecretType::Opaque,
            data: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable.unwrap_or(false)
    }

    /// Store a plain-text value under `key`
    pub fn set_plain_value(&mut self, key: impl Into<String>, value: &str) {
        self.data.insert(key.into(), value.as_bytes().to_vec());
    }

    /// Store raw bytes under `key`
    pub fn set_value(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.data.insert(key.into(), value);
    }

    /// Plain-text value of `key`
    pub fn plain_value(&self, key: &str) -> Result<String> {
        self.data
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .ok_or_else(|| CoreError::not_found("key", key))
    }

    /// Plain-text value of `key`, or an empty string when absent
    pub fn plain_value_or_empty(&self, key: &str) -> String {
        self.data
            .get(key)
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default()
    }

    /// Remove a data key, failing if it does not exist
    pub fn remove_key(&mut self, key: &str) -> Result<Vec<u8>> {
        self.data
            .remove(key)
            .ok_or_else(|| CoreError::not_found("key", key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Data keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Parse a manifest, checking it is a `v1` `Secret`
    pub fn from_yaml(content: &str) -> Result<Self> {
        let secret: Self = serde_yaml::from_str(content).map_err(|e| CoreError::Parse {
            message: e.to_string(),
        })?;

        if secret.api_version != API_VERSION || secret.kind != KIND {
            return Err(CoreError::Parse {
                message: format!(
                    "expected apiVersion={} kind={}, got apiVersion={} kind={}",
                    API_VERSION, KIND, secret.api_version, secret.kind
                ),
            });
        }

        Ok(secret)
    }

    /// Read and parse a manifest from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Serialize to Kubernetes YAML with base64-encoded data
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// =============================================================================
// DOCKER REGISTRY
// =============================================================================

#[derive(Serialize)]
struct DockerConfig<'a> {
    auths: BTreeMap<&'a str, DockerAuth<'a>>,
}

#[derive(Serialize)]
struct DockerAuth<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    auth: String,
}

/// Build the `.dockerconfigjson` blob for a single registry
pub fn docker_config_json(
    server: &str,
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<Vec<u8>> {
    let auth = DockerAuth {
        username,
        password,
        email: email.filter(|e| !e.is_empty()),
        auth: STANDARD.encode(format!("{username}:{password}")),
    };
    let config = DockerConfig {
        auths: BTreeMap::from([(server, auth)]),
    };
    Ok(serde_json::to_vec(&config)?)
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod base64_data {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(data: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(data.len()))?;
        for (key, value) in data {
            map.serialize_entry(key, &STANDARD.encode(value))?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;

        raw.unwrap_or_default()
            .into_iter()
            .map(|(key, encoded)| {
                let encoded: String = encoded
                    .unwrap_or_default()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                STANDARD
                    .decode(encoded.as_bytes())
                    .map(|bytes| (key.clone(), bytes))
                    .map_err(|e| D::Error::custom(format!("data key {key:?}: invalid base64: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPAQUE: &str = r#"apiVersion: v1
kind: Secret
metadata:
  name: my-secret
  namespace: default
  labels:
    app: myapp
type: Opaque
data:
  API_KEY: bXlzZWNyZXQ=
  EMPTY: ""
"#;

    #[test]
    fn test_new_secret_defaults() {
        let secret = Secret::new("my-secret", "prod");
        assert_eq!(secret.api_version, "v1");
        assert_eq!(secret.kind, "Secret");
        assert_eq!(secret.name(), "my-secret");
        assert_eq!(secret.namespace(), "prod");
        assert_eq!(secret.secret_type, SecretType::Opaque);
        assert!(secret.data.is_empty());
        assert!(!secret.is_immutable());
    }

    #[test]
    fn test_from_yaml_decodes_base64() {
        let secret = Secret::from_yaml(OPAQUE).unwrap();
        assert_eq!(secret.plain_value("API_KEY").unwrap(), "mysecret");
        assert_eq!(secret.plain_value("EMPTY").unwrap(), "");
        assert_eq!(secret.metadata.labels.get("app").map(String::as_str), Some("myapp"));
    }

    #[test]
    fn test_to_yaml_encodes_base64() {
        let mut secret = Secret::new("s", "default");
        secret.set_plain_value("API_KEY", "mysecret");
        let yaml = secret.to_yaml().unwrap();
        assert!(yaml.contains("API_KEY: bXlzZWNyZXQ="));
        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("kind: Secret"));
        assert!(!yaml.contains("mysecret"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut secret = Secret::new("round-trip", "ns");
        secret.secret_type = SecretType::Tls;
        secret.immutable = Some(true);
        secret.metadata.annotations.insert("owner".into(), "me".into());
        secret.set_value("tls.crt", b"-----BEGIN CERT-----\nabc\n".to_vec());
        secret.set_plain_value("tls.key", "key");

        let reparsed = Secret::from_yaml(&secret.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed, secret);
    }

    #[test]
    fn test_missing_data_is_empty_map() {
        let secret = Secret::from_yaml("apiVersion: v1\nkind: Secret\nmetadata:\n  name: s\n").unwrap();
        assert!(secret.data.is_empty());

        let secret = Secret::from_yaml(
            "apiVersion: v1\nkind: Secret\nmetadata:\n  name: s\n  labels: null\ndata: null\n",
        )
        .unwrap();
        assert!(secret.data.is_empty());
        assert!(secret.metadata.labels.is_empty());
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let err = Secret::from_yaml("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: s\n")
            .unwrap_err();
        assert!(err.to_string().contains("kind=ConfigMap"));

        let err = Secret::from_yaml("apiVersion: v2\nkind: Secret\n").unwrap_err();
        assert!(err.to_string().contains("apiVersion=v2"));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = Secret::from_yaml("apiVersion: v1\nkind: Secret\ndata:\n  K: '!!!'\n")
            .unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn test_plain_value_missing_key() {
        let secret = Secret::new("s", "default");
        let err = secret.plain_value("NOPE").unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert_eq!(secret.plain_value_or_empty("NOPE"), "");
    }

    #[test]
    fn test_remove_key() {
        let mut secret = Secret::from_yaml(OPAQUE).unwrap();
        assert!(secret.remove_key("API_KEY").is_ok());
        assert!(!secret.contains_key("API_KEY"));
        assert!(secret.remove_key("API_KEY").is_err());
    }

    #[test]
    fn test_secret_type_round_trip() {
        for name in [
            "Opaque",
            "kubernetes.io/tls",
            "kubernetes.io/basic-auth",
            "example.com/custom",
        ] {
            assert_eq!(SecretType::parse(name).as_str(), name);
        }
        assert_eq!(
            SecretType::parse("example.com/custom"),
            SecretType::Other("example.com/custom".into())
        );
    }

    #[test]
    fn test_missing_type_defaults_to_opaque() {
        let secret = Secret::from_yaml("apiVersion: v1\nkind: Secret\n").unwrap();
        assert_eq!(secret.secret_type, SecretType::Opaque);
    }

    #[test]
    fn test_docker_config_json() {
        let blob = docker_config_json("ghcr.io", "user", "token", None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
        let auth = &value["auths"]["ghcr.io"];
        assert_eq!(auth["username"], "user");
        assert_eq!(auth["password"], "token");
        assert_eq!(auth["auth"], STANDARD.encode("user:token"));
        assert!(auth.get("email").is_none());

        let blob = docker_config_json("ghcr.io", "u", "p", Some("me@example.com")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
        assert_eq!(value["auths"]["ghcr.io"]["email"], "me@example.com");
    }
}
