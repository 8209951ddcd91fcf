//! # Render Subcommand
//!
//! Renders one template through the same lookup the application uses,
//! including office-specific variants selected by `office.id` in the payload.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use modhub_engine::Engine;
use modhub_template::TemplateKind;

/// Arguments for the render subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Module owning the template.
    #[arg(long)]
    pub module: String,

    /// Template kind: email, notification, text or error.
    #[arg(long)]
    pub kind: TemplateKind,

    /// Template id, without office or e-mail suffix.
    #[arg(long)]
    pub template: String,

    /// JSON payload passed to the template.
    #[arg(long, default_value = "{}")]
    pub payload: String,
}

/// Execute the render subcommand.
///
/// Returns exit code: 0 if the template rendered, 1 if it was not found.
pub fn run_render(args: &RenderArgs, engine: &Engine) -> Result<u8> {
    let payload: Value =
        serde_json::from_str(&args.payload).context("--payload is not valid JSON")?;
    let snapshot = match crate::load(engine) {
        Ok(snapshot) => snapshot,
        Err(code) => return Ok(code),
    };
    let templates = &snapshot.templates;

    let rendered = match args.kind {
        TemplateKind::Email => templates
            .email(&args.module, &args.template, &payload)
            .map(|email| format!("Subject: {}\n\n{}", email.subject, email.html)),
        kind => templates.render(&args.module, kind, &args.template, &payload),
    };

    match rendered {
        Some(text) => {
            println!("{text}");
            Ok(0)
        }
        None => {
            println!(
                "FAIL: template '{}' of kind {} not found in module '{}'",
                args.template, args.kind, args.module
            );
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn args(template: &str) -> RenderArgs {
        RenderArgs {
            module: "events".to_string(),
            kind: TemplateKind::Text,
            template: template.to_string(),
            payload: r#"{"name":"Ada"}"#.to_string(),
        }
    }

    #[test]
    fn test_render_found_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        testutil::seed(dir.path());
        let engine = testutil::engine(dir.path());
        assert_eq!(run_render(&args("greeting"), &engine).unwrap(), 0);
        assert_eq!(run_render(&args("farewell"), &engine).unwrap(), 1);
    }

    #[test]
    fn test_invalid_payload_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        testutil::seed(dir.path());
        let mut bad = args("greeting");
        bad.payload = "{".to_string();
        assert!(run_render(&bad, &testutil::engine(dir.path())).is_err());
    }
}
