//! # Validate and Order Subcommands
//!
//! `validate` runs the whole load pipeline and reports either a summary or
//! the first error. `order` prints the leaves-first module order, one id
//! per line, for scripting.

use anyhow::Result;
use clap::Args;

use modhub_engine::Engine;

/// Arguments for the validate subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Print the snapshot summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the configuration loads, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, engine: &Engine) -> Result<u8> {
    let snapshot = match crate::load(engine) {
        Ok(snapshot) => snapshot,
        Err(code) => return Ok(code),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.summary())?);
    } else {
        println!(
            "OK: {} ({} modules, {} integrations, {} templates)",
            snapshot.config.app.name,
            snapshot.modules.len(),
            snapshot.integrations.len(),
            snapshot.templates.template_count()
        );
        println!("  order: {}", snapshot.module_order().join(" -> "));
    }
    Ok(0)
}

/// Execute the order subcommand.
pub fn run_order(engine: &Engine) -> Result<u8> {
    let snapshot = match crate::load(engine) {
        Ok(snapshot) => snapshot,
        Err(code) => return Ok(code),
    };
    for id in snapshot.module_order() {
        println!("{id}");
    }
    Ok(0)
}
