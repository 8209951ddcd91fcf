//! # modhub-cli — Command-Line Interface
//!
//! Provides the `modhub` binary. Every subcommand runs the full load
//! pipeline once through an [`Engine`] and then inspects the snapshot.
//!
//! ## Subcommands
//!
//! - `modhub validate`: load everything and report the first error.
//! - `modhub order`: print the resolved module order.
//! - `modhub generate --out <dir> [--check]`: write or verify generated sources.
//! - `modhub permissions`: effective permissions of a user.
//! - `modhub render`: render one template against a JSON payload.
//!
//! ```bash
//! modhub validate --config-dir deploy/config
//! modhub generate --out web/src/generated --check
//! modhub render --module events --kind notification --template eventCreated \
//!     --payload '{"event":{"name":"Launch"},"office":{"id":"berlin"}}'
//! ```
//!
//! Exit codes: 0 on success, 1 when validation or `--check` fails, 2 on an
//! operational error.

pub mod generate;
pub mod permissions;
pub mod render;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use modhub_core::AppError;
use modhub_engine::{Engine, EngineSettings, Snapshot};

/// Filesystem locations, shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Project root holding `config/`, `modules/`, `custom-modules/` and `integrations/`.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Directory with app.json, company.json, permissions.json and modules.json.
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Root of the bundled modules.
    #[arg(long, global = true)]
    pub modules_dir: Option<PathBuf>,

    /// Root of tenant-specific modules, searched before --modules-dir.
    #[arg(long, global = true)]
    pub custom_modules_dir: Option<PathBuf>,

    /// Directory with one integration manifest per integration.
    #[arg(long, global = true)]
    pub integrations_dir: Option<PathBuf>,
}

impl LocationArgs {
    /// Conventional layout under `--root` (default: the current directory),
    /// with each explicit flag taking precedence.
    pub fn settings(&self) -> EngineSettings {
        let mut settings = match &self.root {
            Some(root) => EngineSettings::from_root(root),
            None => EngineSettings::default(),
        };
        if let Some(dir) = &self.config_dir {
            settings.config_dir = dir.clone();
        }
        if let Some(dir) = &self.modules_dir {
            settings.modules_dir = dir.clone();
        }
        if let Some(dir) = &self.custom_modules_dir {
            settings.custom_modules_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.integrations_dir {
            settings.integrations_dir = dir.clone();
        }
        settings
    }

    pub fn engine(&self) -> Result<Engine> {
        Engine::new(self.settings()).context("failed to compile embedded schemas")
    }
}

/// Print a load failure in the `FAIL:` format used by every subcommand.
pub fn report_error(err: &AppError) {
    println!("FAIL: {}", err.message());
    println!("  kind: {}", err.kind());
    if let Some(payload) = err.payload() {
        if let Ok(text) = serde_json::to_string_pretty(&payload) {
            for line in text.lines() {
                println!("  {line}");
            }
        }
    }
}

/// Load once; on failure report the error and yield the exit code.
pub fn load(engine: &Engine) -> std::result::Result<Arc<Snapshot>, u8> {
    engine.reload().map_err(|e| {
        report_error(&e);
        1
    })
}
