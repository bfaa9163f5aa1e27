//! k8s-secret-manifest - Generate, edit, validate and seal Kubernetes Secret manifests

use clap::{Args, Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;
mod util;

use error::CliError;

#[derive(Parser)]
#[command(name = "k8s-secret-manifest")]
#[command(version)]
#[command(about = "Generate and seal Kubernetes Secret manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Kubernetes namespace
    #[arg(short, long, global = true, env = "KSM_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Path to kubeseal binary
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "KUBESEAL_PATH",
        default_value = "kubeseal"
    )]
    pub kubeseal_path: PathBuf,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new Secret manifest
    Generate(commands::generate::GenerateArgs),

    /// Generate a Secret manifest from a .env file
    FromEnv(commands::from_env::FromEnvArgs),

    /// Export decoded Secret values as a .env file
    ExportEnv(commands::export_env::ExportEnvArgs),

    /// Update values, labels or annotations of an existing manifest
    Update(commands::update::UpdateArgs),

    /// Rotate keys with new cryptographically random values
    Rotate(commands::rotate::RotateArgs),

    /// Copy a Secret manifest under a new name and namespace
    Copy(commands::copy::CopyArgs),

    /// List the data keys of a Secret manifest
    List(commands::list::ListArgs),

    /// Show decoded Secret values
    Show(commands::show::ShowArgs),

    /// Diff two Secret manifests (decoded)
    Diff(commands::diff::DiffArgs),

    /// Seal a Secret manifest with kubeseal
    Seal(commands::seal::SealArgs),

    /// Add an entry to a paired index-list
    AddEntry(commands::add_entry::AddEntryArgs),

    /// Remove an entry from a paired index-list
    RemoveEntry(commands::remove_entry::RemoveEntryArgs),

    /// Validate a Secret manifest for correctness
    Validate(commands::validate::ValidateArgs),

    /// Edit a Secret manifest's values in $EDITOR
    Edit(commands::edit::EditArgs),
}

fn main() -> ExitCode {
    // Setup miette for nice panic display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    let global = &cli.global;
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(global, args),
        Commands::FromEnv(args) => commands::from_env::run(global, args),
        Commands::ExportEnv(args) => commands::export_env::run(global, args),
        Commands::Update(args) => commands::update::run(global, args),
        Commands::Rotate(args) => commands::rotate::run(global, args),
        Commands::Copy(args) => commands::copy::run(global, args),
        Commands::List(args) => commands::list::run(global, args),
        Commands::Show(args) => commands::show::run(global, args),
        Commands::Diff(args) => commands::diff::run(global, args),
        Commands::Seal(args) => commands::seal::run(global, args),
        Commands::AddEntry(args) => commands::add_entry::run(global, args),
        Commands::RemoveEntry(args) => commands::remove_entry::run(global, args),
        Commands::Validate(args) => commands::validate::run(global, args),
        Commands::Edit(args) => commands::edit::run(global, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => ExitCode::from(report_error(&report)),
    }
}

/// `KSM_LOG` takes precedence; otherwise `--debug` selects debug level
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("KSM_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print the error chain on one line and return the exit code
fn report_error(report: &miette::Report) -> u8 {
    let mut message = report.to_string();
    for cause in report.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message.push_str(": ");
            message.push_str(&cause);
        }
    }

    eprintln!("{} {}", style("Error:").red().bold().for_stderr(), message);
    if let Some(help) = report.help() {
        eprintln!("  {} {}", style("help:").blue().for_stderr(), help);
    }

    let code = report
        .downcast_ref::<CliError>()
        .map_or(exit_codes::ERROR, CliError::exit_code);
    u8::try_from(code).unwrap_or(1)
}
