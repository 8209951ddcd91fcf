//! # Error Types — Configuration Error Taxonomy
//!
//! [`AppError`] is the engine's distinguished, recoverable error: every
//! variant describes a misconfiguration an operator can fix by editing a file
//! or setting an environment variable. The top-level load stores an
//! `AppError` as the engine's current error state instead of crashing.
//!
//! Anything that is *not* an `AppError` (a broken embedded schema, an I/O
//! failure while writing generated artifacts) is a bug or an environment
//! failure and is reported through crate-specific error types instead.
//!
//! ## Design
//!
//! - `Display` is the human-readable `message`.
//! - [`AppError::payload`] carries supplementary structured detail (missing
//!   credential names, the list of unresolvable modules, violations).
//! - The type is `Clone` so the engine can hand the stored error to any
//!   number of callers.

use std::path::PathBuf;

use serde_json::{json, Value};
use thiserror::Error;

use crate::identity::{IntegrationId, ModuleId};
use crate::violation::ValidationViolations;

/// Convenience alias used throughout the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Recoverable configuration error.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// A configuration or manifest file does not exist.
    #[error("configuration file not found: {}", .path.display())]
    ConfigNotFound {
        /// Path that was probed.
        path: PathBuf,
    },

    /// A configuration file exists but could not be read.
    #[error("configuration file {} could not be read: {reason}", .path.display())]
    ConfigUnreadable {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },

    /// A configuration file is not valid JSON (or YAML for templates).
    #[error("configuration file {} could not be parsed: {reason}", .path.display())]
    ConfigParse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Parser error text including line/column.
        reason: String,
    },

    /// A document failed structural or cross-field validation.
    #[error("{subject} failed validation:\n{violations}")]
    SchemaValidation {
        /// What was validated: a file path or e.g. `module 'events' metadata`.
        subject: String,
        /// Every violated constraint.
        violations: ValidationViolations,
    },

    /// An enabled module has no manifest in any search root.
    #[error("module '{module_id}' not found, checked {}", display_paths(.checked))]
    ModuleNotFound {
        /// The enabled module id.
        module_id: ModuleId,
        /// Manifest paths that were probed, in priority order.
        checked: Vec<PathBuf>,
    },

    /// A manifest declares a different id than the directory it lives in.
    #[error("manifest {} declares id '{found}' but is located under module '{expected}'", .path.display())]
    ManifestIdMismatch {
        /// Directory (expected) id.
        expected: String,
        /// Id found inside the manifest.
        found: String,
        /// Manifest path.
        path: PathBuf,
    },

    /// A module depends on a module that is not enabled.
    #[error("module '{module_id}' depends on '{dependency}', which is not enabled in modules.json")]
    MissingDependency {
        /// The dependent module.
        module_id: ModuleId,
        /// The missing dependency.
        dependency: ModuleId,
    },

    /// The dependency graph could not be ordered.
    #[error("could not resolve module dependencies (circular or unresolved): {}", .unresolved.join(", "))]
    DependencyCycle {
        /// Every module id left in the unresolved remainder, sorted.
        unresolved: Vec<String>,
    },

    /// A module requires integrations it did not enable.
    #[error(
        "module '{module_id}' requires integrations [{}] which are not enabled; add them to \"enabledIntegrations\" for this module in {config_file}",
        join_ids(.missing)
    )]
    MissingIntegration {
        /// The module.
        module_id: ModuleId,
        /// Required but not enabled.
        missing: Vec<IntegrationId>,
        /// File the operator must edit.
        config_file: String,
    },

    /// A module enabled integrations it does not support.
    #[error(
        "module '{module_id}' does not support integrations [{}]; remove them from \"enabledIntegrations\" in {config_file}",
        join_ids(.unsupported)
    )]
    UnsupportedIntegration {
        /// The module.
        module_id: ModuleId,
        /// Enabled but neither required nor recommended.
        unsupported: Vec<IntegrationId>,
        /// File the operator must edit.
        config_file: String,
    },

    /// An integration is missing environment credentials.
    #[error("integration '{integration_id}' is missing credentials: {}", .missing.join(", "))]
    MissingCredential {
        /// The integration.
        integration_id: IntegrationId,
        /// Missing or empty environment variable names.
        missing: Vec<String>,
    },

    /// A module-supplied metadata schema does not compile.
    #[error("module '{module_id}' ships an invalid metadata schema: {reason}")]
    InvalidMetadataSchema {
        /// The module.
        module_id: ModuleId,
        /// Compiler error text.
        reason: String,
    },

    /// A portal entry references a module or component that is unavailable.
    #[error("portal '{portal}' of module '{module_id}' references {reference}: {reason}")]
    InvalidPortalReference {
        /// Module whose config declares the portal.
        module_id: ModuleId,
        /// Portal (extension point) name.
        portal: String,
        /// `<module>/<component>` reference.
        reference: String,
        /// Why it is invalid.
        reason: String,
    },

    /// A template does not compile.
    #[error("{kind} template '{template}' of module '{module_id}' is invalid: {reason}")]
    TemplateSyntax {
        /// The module.
        module_id: ModuleId,
        /// Template kind (email, notification, text, error).
        kind: String,
        /// Template id.
        template: String,
        /// Compiler error text.
        reason: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_ids(ids: &[IntegrationId]) -> String {
    ids.iter()
        .map(IntegrationId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Stable machine-readable kind, e.g. for a maintenance page.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::ConfigUnreadable { .. } => "config_unreadable",
            Self::ConfigParse { .. } => "config_parse_error",
            Self::SchemaValidation { .. } => "schema_validation_error",
            Self::ModuleNotFound { .. } => "module_not_found",
            Self::ManifestIdMismatch { .. } => "manifest_id_mismatch",
            Self::MissingDependency { .. } => "missing_dependency",
            Self::DependencyCycle { .. } => "dependency_cycle",
            Self::MissingIntegration { .. } => "missing_integration",
            Self::UnsupportedIntegration { .. } => "unsupported_integration",
            Self::MissingCredential { .. } => "missing_credential",
            Self::InvalidMetadataSchema { .. } => "invalid_metadata_schema",
            Self::InvalidPortalReference { .. } => "invalid_portal_reference",
            Self::TemplateSyntax { .. } => "template_syntax",
        }
    }

    /// Human-readable message (same text as `Display`).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Supplementary structured detail, if the variant carries any.
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::ConfigNotFound { path } => Some(json!({ "path": path })),
            Self::ConfigUnreadable { path, reason } | Self::ConfigParse { path, reason } => {
                Some(json!({ "path": path, "reason": reason }))
            }
            Self::SchemaValidation {
                subject,
                violations,
            } => Some(json!({
                "subject": subject,
                "violations": violations,
                "formatted": violations.to_string(),
            })),
            Self::ModuleNotFound { checked, .. } => Some(json!({ "checked": checked })),
            Self::DependencyCycle { unresolved } => Some(json!({ "unresolved": unresolved })),
            Self::MissingIntegration { missing, .. } => Some(json!({ "missing": missing })),
            Self::UnsupportedIntegration { unsupported, .. } => {
                Some(json!({ "unsupported": unsupported }))
            }
            Self::MissingCredential { missing, .. } => Some(json!({ "missing": missing })),
            Self::ManifestIdMismatch { .. }
            | Self::MissingDependency { .. }
            | Self::InvalidMetadataSchema { .. }
            | Self::InvalidPortalReference { .. }
            | Self::TemplateSyntax { .. } => None,
        }
    }
}
