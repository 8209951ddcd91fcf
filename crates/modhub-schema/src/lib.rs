//! # modhub-schema — Configuration Schema Validation
//!
//! Validates every configuration document the engine reads: the global
//! files (`app.json`, `company.json`, `permissions.json`, `modules.json`),
//! module manifests and integration manifests.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaValidator`] compiles the embedded JSON Schemas once and checks a
//! document structurally, then runs the cross-field rules registered for
//! that document. All violations are reported together.
//!
//! ## Rules (`rules`)
//!
//! Named business rules that JSON Schema cannot express, such as "an office
//! that allows desk reservation must configure visits and areas".
//!
//! ## Metadata (`metadata`)
//!
//! Per-module metadata is validated against the schema the module itself
//! exports, then narrowed by filling in declared defaults.
//!
//! ## Crate Policy
//!
//! - Depends only on `modhub-core` internally.
//! - Schema `$id` and `$ref` URIs must stay under
//!   [`validate::SCHEMA_URI_PREFIX`]; references are resolved locally.

pub mod metadata;
pub mod rules;
pub mod validate;

pub use rules::{evaluate_rules, CrossFieldRule, RuleScope};
pub use validate::{SchemaError, SchemaId, SchemaValidator};
