//! # modhub-core — Foundational Types
//!
//! Every other crate in the workspace depends on `modhub-core`; it depends on
//! nothing internal.
//!
//! ## Contents
//!
//! - [`AppError`]: the recoverable configuration-error taxonomy. Anything an
//!   operator can fix by editing configuration is an `AppError`.
//! - [`Violation`] / [`ValidationViolations`]: structured validation failures
//!   that join into one readable multi-line message.
//! - Identifier newtypes ([`ModuleId`], [`IntegrationId`], [`RoleId`],
//!   [`OfficeId`]) with validated constructors. No bare strings for ids.
//! - [`case`]: PascalCase / camelCase conversion for template suffixes and
//!   generated identifiers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `modhub-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod case;
pub mod error;
pub mod identity;
pub mod violation;

pub use error::{AppError, AppResult};
pub use identity::{IdentifierError, IntegrationId, ModuleId, OfficeId, RoleId};
pub use violation::{ValidationViolations, Violation};
