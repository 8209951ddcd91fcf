//! # modhub-registry — Modules, Integrations & Permissions
//!
//! Everything derived from the module list after the configuration files
//! have been loaded:
//!
//! - [`registry`]: discovery of enabled modules across the custom and
//!   default roots, capability resolution and metadata narrowing.
//! - [`catalog`]: explicit capability registrations ([`ModuleCatalog`]).
//! - [`resolver`]: leaves-first dependency ordering.
//! - [`integration`]: required/recommended integration checks and
//!   credential verification.
//! - [`permissions`]: the per-request [`PermissionIndex`].

pub mod catalog;
pub mod integration;
pub mod permissions;
pub mod registry;
pub mod resolver;

pub use catalog::{BuildProps, CapabilitySource, ModuleCatalog, ModuleDescriptor};
pub use integration::{CredentialSource, IntegrationValidator, ProcessEnv};
pub use permissions::PermissionIndex;
pub use registry::{order_modules, AppModule, ModuleRegistry, ModuleRoots};
pub use resolver::resolve_order;
