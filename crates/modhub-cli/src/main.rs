//! # modhub CLI entry point
//!
//! Parses command-line arguments, builds the engine from the location
//! flags and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use modhub_cli::generate::{run_generate, GenerateArgs};
use modhub_cli::permissions::{run_permissions, PermissionsArgs};
use modhub_cli::render::{run_render, RenderArgs};
use modhub_cli::validate::{run_order, run_validate, ValidateArgs};
use modhub_cli::LocationArgs;

/// modhub: module configuration and resolution engine.
///
/// Loads the application, company, permission and module configuration,
/// resolves enabled modules and their integrations, and generates the
/// sources the client build imports.
#[derive(Parser, Debug)]
#[command(name = "modhub", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    locations: LocationArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and validate the full configuration.
    Validate(ValidateArgs),

    /// Print enabled modules in dependency order.
    Order,

    /// Write or verify generated client sources.
    Generate(GenerateArgs),

    /// Show the effective permissions of a user.
    Permissions(PermissionsArgs),

    /// Render a module template against a JSON payload.
    Render(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let settings = cli.locations.settings();
    tracing::debug!(
        config_dir = %settings.config_dir.display(),
        modules_dir = %settings.modules_dir.display(),
        "resolved locations"
    );

    let result = cli.locations.engine().and_then(|engine| match &cli.command {
        Commands::Validate(args) => run_validate(args, &engine),
        Commands::Order => run_order(&engine),
        Commands::Generate(args) => run_generate(args, &engine),
        Commands::Permissions(args) => run_permissions(args, &engine),
        Commands::Render(args) => run_render(args, &engine),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
