//! # Generate Subcommand
//!
//! Renders the generated TypeScript sources for the enabled modules and
//! writes them, or with `--check` verifies the files on disk are current.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use modhub_codegen::{check, render_all, write_artifacts};
use modhub_engine::Engine;

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output directory for the generated files.
    #[arg(long)]
    pub out: PathBuf,

    /// Verify the generated files without rewriting them.
    #[arg(long)]
    pub check: bool,
}

/// Execute the generate subcommand.
///
/// Returns exit code: 0 on success, 1 if loading or --check fails.
pub fn run_generate(args: &GenerateArgs, engine: &Engine) -> Result<u8> {
    let snapshot = match crate::load(engine) {
        Ok(snapshot) => snapshot,
        Err(code) => return Ok(code),
    };
    let artifacts = render_all(&snapshot.modules).context("failed to render generated sources")?;

    if args.check {
        let stale = check(&args.out, &artifacts);
        if stale.is_empty() {
            println!("OK: generated sources are up to date");
            return Ok(0);
        }
        for artifact in &stale {
            let path = args.out.join(artifact.file_name);
            match &artifact.found_digest {
                None => println!("FAIL: generated file does not exist: {}", path.display()),
                Some(found) => {
                    println!("FAIL: generated file is outdated: {}", path.display());
                    println!("  Expected digest: {}", artifact.expected_digest);
                    println!("  Existing digest: {found}");
                }
            }
        }
        return Ok(1);
    }

    write_artifacts(&args.out, &artifacts)
        .with_context(|| format!("failed to write generated sources to {}", args.out.display()))?;
    println!(
        "OK: wrote {} files to {}",
        artifacts.len(),
        args.out.display()
    );
    Ok(0)
}
