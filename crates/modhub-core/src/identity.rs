//! # Identifier Newtypes
//!
//! Newtype wrappers for every identifier namespace the engine deals with.
//! A `ModuleId` cannot be passed where an `IntegrationId` is expected, and
//! every constructor validates the character set so that identifiers can be
//! embedded in file paths, template names, and generated source without
//! further escaping.
//!
//! ## Character sets
//!
//! - `ModuleId`, `IntegrationId`: `^[A-Za-z][A-Za-z0-9_-]*$`
//! - `RoleId`, `OfficeId`: `^[A-Za-z0-9_-]+$`

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum identifier length accepted by any constructor.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// An identifier failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}': {reason}")]
pub struct IdentifierError {
    /// Identifier namespace (e.g. "module id").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

fn check(kind: &'static str, value: &str, leading_letter: bool) -> Result<(), IdentifierError> {
    let fail = |reason| IdentifierError {
        kind,
        value: value.to_string(),
        reason,
    };
    if value.is_empty() {
        return Err(fail("must not be empty"));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(fail("must not exceed 64 characters"));
    }
    if leading_letter && !value.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(fail("must start with an ASCII letter"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(fail("may only contain [A-Za-z0-9_-]"));
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $leading_letter:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
                let value = value.into();
                check($kind, &value, $leading_letter)?;
                Ok(Self(value))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentifierError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Identifier of a pluggable application module (e.g. `events`).
    ModuleId,
    "module id",
    true
);

identifier!(
    /// Identifier of a third-party integration (e.g. `matrix`).
    IntegrationId,
    "integration id",
    true
);

identifier!(
    /// Identifier of a permission role (e.g. `admin`).
    RoleId,
    "role id",
    false
);

identifier!(
    /// Identifier of an office / tenant. Used as a template-name suffix,
    /// so it must convert cleanly to PascalCase.
    OfficeId,
    "office id",
    false
);
