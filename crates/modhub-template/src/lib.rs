//! # modhub-template — Template Resolution Engine
//!
//! Per-module message templates in four kinds (`email`, `notification`,
//! `text`, `error`), loaded from YAML, merged with operator overrides, and
//! rendered with Handlebars against a JSON payload.
//!
//! Template failures are deliberately soft: a missing or failing template
//! is logged at `warn` and resolves to `None`. Only a template that does not
//! compile is an error, and it is reported when templates are loaded.

pub mod render;
pub mod store;

pub use render::{RenderedEmail, TemplateEngine};
pub use store::{TemplateKind, TemplatePaths, TemplateStore};
