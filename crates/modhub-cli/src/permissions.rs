//! # Permissions Subcommand
//!
//! Shows what a user would be allowed to do: the default role their e-mail
//! maps to, whether they are a superuser, and their effective permissions.

use anyhow::Result;
use clap::Args;

use modhub_engine::Engine;

/// Arguments for the permissions subcommand.
#[derive(Args, Debug, Default)]
pub struct PermissionsArgs {
    /// Primary e-mail of the user.
    #[arg(long)]
    pub email: Option<String>,

    /// Linked account e-mails. Repeatable.
    #[arg(long)]
    pub linked: Vec<String>,

    /// Role to evaluate. Defaults to the role derived from --email.
    #[arg(long)]
    pub role: Option<String>,
}

/// Execute the permissions subcommand.
pub fn run_permissions(args: &PermissionsArgs, engine: &Engine) -> Result<u8> {
    let snapshot = match crate::load(engine) {
        Ok(snapshot) => snapshot,
        Err(code) => return Ok(code),
    };
    let index = &snapshot.permissions;
    let email = args.email.as_deref();

    let default_role = index.default_role_by_email(email);
    let role = args.role.as_deref().unwrap_or(default_role.as_str());
    let report = serde_json::json!({
        "email": email,
        "defaultRole": default_role.as_str(),
        "role": role,
        "superuser": index.is_superuser(email, &args.linked),
        "permissions": index.user_permissions(email, &args.linked, Some(role)),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
