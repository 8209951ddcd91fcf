//! # modhub-config — Configuration Documents & Loader
//!
//! Typed forms of the hand-authored JSON configuration and the loader that
//! produces them. A document only becomes a typed value after it has been
//! parsed, checked against its embedded schema, and passed every cross-field
//! rule; any failure is an [`modhub_core::AppError`].
//!
//! ## Files
//!
//! | File | Type |
//! |------|------|
//! | `app.json` | [`AppConfig`] |
//! | `company.json` | [`CompanyConfig`] |
//! | `permissions.json` | [`PermissionsConfig`] |
//! | `modules.json` | `Vec<`[`ModuleConfig`]`>` |
//! | `<module>/module.json` | [`ModuleManifest`] |
//! | `<integration>/integration.json` | [`IntegrationManifest`] |

pub mod documents;
pub mod loader;

pub use documents::{
    AppConfig, Audience, AuthProvider, ClientRouter, CompanyConfig, ComponentRef,
    IntegrationManifest, Layout, ManifestExports, ModuleConfig, ModuleManifest, Office,
    PermissionsConfig, Route, Space, VisitsConfig, DEFAULT_ROLE_KEY,
};
pub use loader::{read_file, read_json, ConfigLoader, ConfigPaths, ConfigSet, MODULES_FILE};
