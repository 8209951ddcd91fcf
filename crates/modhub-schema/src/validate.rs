//! # Schema Validation
//!
//! Runtime validation of configuration documents against JSON Schema
//! definitions (Draft 2020-12), followed by the cross-field rules registered
//! for each schema.
//!
//! ## Schema Resolution
//!
//! All first-party schemas are compiled into the binary and carry `$id` URIs
//! of the form `https://schemas.modhub.dev/<filename>`. Cross-schema `$ref`s
//! (`common.schema.json#/$defs/...`) are resolved by a local retriever, so
//! validation never touches the network or the filesystem.
//!
//! ## Error Model
//!
//! Validation never stops at the first problem: structural violations and
//! rule violations are gathered into one [`ValidationViolations`] that
//! renders as a multi-line message.

use std::collections::HashMap;
use std::fmt;

use jsonschema::{Retrieve, Uri, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use modhub_core::{AppError, ModuleId, ValidationViolations, Violation};

use crate::metadata::apply_defaults;
use crate::rules::evaluate_rules;

/// URI prefix shared by every embedded schema.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.modhub.dev/";

/// Identifies one of the embedded configuration schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaId {
    /// `app.json`
    App,
    /// `company.json`
    Company,
    /// `permissions.json`
    Permissions,
    /// `modules.json`
    Modules,
    /// `<module>/module.json`
    ModuleManifest,
    /// `<integration>/integration.json`
    IntegrationManifest,
}

impl SchemaId {
    /// Every validating schema (excludes the shared definitions file).
    pub const ALL: [SchemaId; 6] = [
        SchemaId::App,
        SchemaId::Company,
        SchemaId::Permissions,
        SchemaId::Modules,
        SchemaId::ModuleManifest,
        SchemaId::IntegrationManifest,
    ];

    /// Schema filename, also the last segment of its `$id`.
    pub fn filename(self) -> &'static str {
        match self {
            Self::App => "app.schema.json",
            Self::Company => "company.schema.json",
            Self::Permissions => "permissions.schema.json",
            Self::Modules => "modules.schema.json",
            Self::ModuleManifest => "module.schema.json",
            Self::IntegrationManifest => "integration.schema.json",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::App => include_str!("../schemas/app.schema.json"),
            Self::Company => include_str!("../schemas/company.schema.json"),
            Self::Permissions => include_str!("../schemas/permissions.schema.json"),
            Self::Modules => include_str!("../schemas/modules.schema.json"),
            Self::ModuleManifest => include_str!("../schemas/module.schema.json"),
            Self::IntegrationManifest => include_str!("../schemas/integration.schema.json"),
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename())
    }
}

const COMMON_SCHEMA: (&str, &str) = (
    "common.schema.json",
    include_str!("../schemas/common.schema.json"),
);

/// An embedded schema failed to load or compile.
///
/// This is a programming error in the shipped schemas, not an operator
/// misconfiguration, so it is deliberately not an [`AppError`].
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema source is not valid JSON.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename.
        schema_name: String,
        /// Parser error text.
        reason: String,
    },

    /// The compiled validator could not be built.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename.
        schema_name: String,
        /// Compiler error text.
        reason: String,
    },
}

/// Local retriever that resolves `$ref` URIs to embedded schemas.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.schemas_by_uri
            .get(filename)
            .cloned()
            .ok_or_else(|| format!("unknown schema reference '{uri_str}'").into())
    }
}

fn parse_schema(name: &str, source: &str) -> Result<Value, SchemaError> {
    serde_json::from_str(source).map_err(|e| SchemaError::SchemaLoadError {
        schema_name: name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Validator for every configuration document the engine reads.
///
/// All embedded schemas are compiled once at construction; validation is
/// then allocation-light and `Send + Sync`.
pub struct SchemaValidator {
    schemas_by_uri: HashMap<String, Value>,
    validators: HashMap<SchemaId, Validator>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut compiled: Vec<_> = self.validators.keys().collect();
        compiled.sort();
        f.debug_struct("SchemaValidator")
            .field("compiled", &compiled)
            .finish()
    }
}

impl SchemaValidator {
    /// Parse and compile every embedded schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if a shipped schema is malformed.
    pub fn new() -> Result<Self, SchemaError> {
        let mut schemas_by_uri = HashMap::new();
        let mut parsed = Vec::with_capacity(SchemaId::ALL.len());

        let (common_name, common_source) = COMMON_SCHEMA;
        let common = parse_schema(common_name, common_source)?;
        schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{common_name}"), common.clone());
        schemas_by_uri.insert(common_name.to_string(), common);

        for id in SchemaId::ALL {
            let value = parse_schema(id.filename(), id.source())?;
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{}", id.filename()), value.clone());
            schemas_by_uri.insert(id.filename().to_string(), value.clone());
            parsed.push((id, value));
        }

        let mut this = Self {
            schemas_by_uri,
            validators: HashMap::new(),
        };
        for (id, value) in parsed {
            let validator =
                this.compile(&value)
                    .map_err(|reason| SchemaError::ValidatorBuildError {
                        schema_name: id.filename().to_string(),
                        reason,
                    })?;
            this.validators.insert(id, validator);
        }
        Ok(this)
    }

    /// Compile `schema` with the local retriever installed.
    fn compile(&self, schema: &Value) -> Result<Validator, String> {
        let retriever = LocalSchemaRetriever {
            schemas_by_uri: self.schemas_by_uri.clone(),
        };
        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(retriever)
            .build(schema)
            .map_err(|e| e.to_string())
    }

    /// Look up an embedded schema document.
    pub fn get_schema(&self, id: SchemaId) -> Option<&Value> {
        self.schemas_by_uri.get(id.filename())
    }

    /// Validate a parsed JSON value: structural schema first, then every
    /// cross-field rule registered for `id`.
    ///
    /// # Errors
    ///
    /// Returns every violation found, never just the first.
    pub fn validate_document(
        &self,
        id: SchemaId,
        instance: &Value,
    ) -> Result<(), ValidationViolations> {
        let mut violations = ValidationViolations::new();
        if let Some(validator) = self.validators.get(&id) {
            violations.extend(validator.iter_errors(instance).map(|e| {
                Violation::structural(e.instance_path.to_string(), e.to_string())
            }));
        }
        violations.extend(evaluate_rules(id, instance).into_inner());
        violations.into_result()
    }

    /// Validate and then deserialize into the typed document.
    ///
    /// # Errors
    ///
    /// Returns the collected violations; a residual deserialization failure
    /// is reported as a root-level violation.
    pub fn validate_typed<T: DeserializeOwned>(
        &self,
        id: SchemaId,
        instance: Value,
    ) -> Result<T, ValidationViolations> {
        self.validate_document(id, &instance)?;
        serde_json::from_value(instance).map_err(|e| {
            ValidationViolations::from(vec![Violation::structural(
                "",
                format!("document does not match {id}: {e}"),
            )])
        })
    }

    /// Validate operator-supplied module metadata against a module's own
    /// metadata schema and return the narrowed value (schema defaults filled
    /// in for absent properties).
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidMetadataSchema`] if the module's schema does not
    ///   compile.
    /// - [`AppError::SchemaValidation`] scoped to `module '<id>' metadata`
    ///   if the metadata is invalid.
    pub fn validate_metadata(
        &self,
        module_id: &ModuleId,
        schema: &Value,
        metadata: &Value,
    ) -> Result<Value, AppError> {
        let validator = self
            .compile(schema)
            .map_err(|reason| AppError::InvalidMetadataSchema {
                module_id: module_id.clone(),
                reason,
            })?;

        let violations: Vec<Violation> = validator
            .iter_errors(metadata)
            .map(|e| Violation::structural(e.instance_path.to_string(), e.to_string()))
            .collect();
        if !violations.is_empty() {
            return Err(AppError::SchemaValidation {
                subject: format!("module '{module_id}' metadata"),
                violations: violations.into(),
            });
        }

        tracing::debug!(module = %module_id, "metadata validated");
        Ok(apply_defaults(schema, metadata))
    }
}
