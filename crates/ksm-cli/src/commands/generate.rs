//! Generate command - build a new Secret manifest from flags

use clap::Args;
use ksm_core::secret::{DOCKER_CONFIG_JSON_KEY, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY, docker_config_json};
use ksm_core::{DEFAULT_SEPARATOR, EntryList, Secret, SecretType, validate_data_key};
use miette::Result;
use std::path::{Path, PathBuf};

use super::{apply_metadata, apply_set_files, apply_set_values, guard, guard_output, write_secret};
use crate::GlobalArgs;
use crate::error::{CliError, CoreResultExt};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  k8s-secret-manifest generate --name my-secret --set API_KEY=abc123
  k8s-secret-manifest generate --name tls-secret --tls-cert tls.crt --tls-key tls.key
  k8s-secret-manifest generate --name pgpool-secret \\
    --entries-key PGPOOL_BACKEND_USERS --entries-val PGPOOL_BACKEND_PASSWORDS \\
    --entry alice:secretpass --entry bob:otherpass")]
pub struct GenerateArgs {
    /// Secret name
    #[arg(short = 'N', long)]
    pub name: String,

    /// key=value pair; repeatable
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// key=filepath pair; file content becomes the value; repeatable
    #[arg(short = 'f', long = "set-file", value_name = "KEY=PATH")]
    pub set_file: Vec<String>,

    /// Secret type (default: Opaque)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub secret_type: Option<String>,

    /// Label to set; repeatable
    #[arg(short, long = "label", value_name = "KEY=VALUE")]
    pub label: Vec<String>,

    /// Annotation to set; repeatable
    #[arg(short, long = "annotation", value_name = "KEY=VALUE")]
    pub annotation: Vec<String>,

    /// Mark the secret as immutable
    #[arg(long)]
    pub immutable: bool,

    /// TLS certificate file; sets type kubernetes.io/tls and key tls.crt
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// TLS private key file; sets type kubernetes.io/tls and key tls.key
    #[arg(long)]
    pub tls_key: Option<PathBuf>,

    /// Docker registry server; sets type kubernetes.io/dockerconfigjson
    #[arg(long)]
    pub docker_server: Option<String>,

    /// Docker registry username
    #[arg(long)]
    pub docker_username: Option<String>,

    /// Docker registry password or token
    #[arg(long)]
    pub docker_password: Option<String>,

    /// Docker registry email
    #[arg(long)]
    pub docker_email: Option<String>,

    /// Data key holding the separator-joined identifier list
    #[arg(short = 'K', long)]
    pub entries_key: Option<String>,

    /// Data key holding the separator-joined value list
    #[arg(short = 'V', long)]
    pub entries_val: Option<String>,

    /// key:value entry for the paired lists; repeatable
    #[arg(short, long = "entry", value_name = "KEY:VALUE")]
    pub entry: Vec<String>,

    /// Separator between list elements
    #[arg(short = 'S', long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(global: &GlobalArgs, args: GenerateArgs) -> Result<()> {
    let output = guard_output(args.output.as_deref())?;
    let secret = build(global, &args)?;
    write_secret(output.as_deref(), &secret)?;
    Ok(())
}

fn build(global: &GlobalArgs, args: &GenerateArgs) -> crate::error::Result<Secret> {
    let mut secret = Secret::new(&args.name, &global.namespace);
    let explicit_type = args.secret_type.is_some();

    if let Some(ty) = &args.secret_type {
        secret.secret_type = SecretType::parse(ty);
    }

    apply_metadata(&mut secret, &args.label, &args.annotation)?;

    if args.immutable {
        secret.immutable = Some(true);
    }

    apply_set_values(&mut secret, &args.set)?;
    apply_set_files(&mut secret, &args.set_file)?;

    match (&args.tls_cert, &args.tls_key) {
        (None, None) => {}
        (Some(cert), Some(key)) => apply_tls(&mut secret, cert, key, explicit_type)?,
        _ => {
            return Err(CliError::usage(
                "--tls-cert and --tls-key must both be provided",
            ));
        }
    }

    let docker = [
        &args.docker_server,
        &args.docker_username,
        &args.docker_password,
    ];
    if docker.iter().any(|f| f.is_some()) {
        let [Some(server), Some(username), Some(password)] = docker else {
            return Err(CliError::usage(
                "--docker-server, --docker-username, and --docker-password are all required",
            ));
        };
        let blob = docker_config_json(server, username, password, args.docker_email.as_deref())
            .context("build dockerconfigjson")?;
        if !explicit_type {
            secret.secret_type = SecretType::DockerConfigJson;
        }
        secret.set_value(DOCKER_CONFIG_JSON_KEY, blob);
    }

    if args.entries_key.is_some() || args.entries_val.is_some() || !args.entry.is_empty() {
        let (Some(entries_key), Some(entries_val)) = (&args.entries_key, &args.entries_val) else {
            return Err(CliError::usage(
                "--entries-key and --entries-val are both required when using --entry flags",
            ));
        };
        validate_data_key(entries_key).context("--entries-key")?;
        validate_data_key(entries_val).context("--entries-val")?;

        let entries = EntryList::from_flags(&args.entry)?;
        let (keys, values) = entries.serialize(&args.separator)?;
        secret.set_plain_value(entries_key, &keys);
        secret.set_plain_value(entries_val, &values);
    }

    Ok(secret)
}

fn apply_tls(
    secret: &mut Secret,
    cert: &Path,
    key: &Path,
    explicit_type: bool,
) -> crate::error::Result<()> {
    let cert = guard("--tls-cert", cert)?;
    let key = guard("--tls-key", key)?;

    let cert = std::fs::read(&cert).map_err(|e| CliError::io("--tls-cert", e))?;
    let key = std::fs::read(&key).map_err(|e| CliError::io("--tls-key", e))?;

    if !explicit_type {
        secret.secret_type = SecretType::Tls;
    }
    secret.set_value(TLS_CERT_KEY, cert);
    secret.set_value(TLS_PRIVATE_KEY_KEY, key);
    Ok(())
}
