//! # Permission Aggregator
//!
//! Flattens the role table and the permissions exported by enabled modules
//! into a [`PermissionIndex`] that answers per-request questions without
//! I/O: which permissions does this user have, and which role does a new
//! user get by default.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use modhub_config::{PermissionsConfig, DEFAULT_ROLE_KEY};
use modhub_core::{AppError, AppResult, RoleId, Violation};

/// Read-only permission lookups for the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionIndex {
    roles: BTreeMap<RoleId, Vec<String>>,
    all: Vec<String>,
    superusers: HashSet<String>,
    domain_roles: BTreeMap<String, RoleId>,
    default_role: RoleId,
}

impl PermissionIndex {
    /// Build the index from the permissions config and the permissions
    /// exported by every enabled module.
    ///
    /// The full set used for superusers is the union of module exports and
    /// every permission named by a role.
    ///
    /// # Errors
    ///
    /// [`AppError::SchemaValidation`] if `defaultRoles` has no `__default`
    /// entry.
    pub fn new<'a, I>(config: &PermissionsConfig, exported: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let default_role = config
            .default_roles
            .get(DEFAULT_ROLE_KEY)
            .cloned()
            .ok_or_else(|| AppError::SchemaValidation {
                subject: "permissions".to_string(),
                violations: vec![Violation::rule(
                    "default-role-required",
                    "/defaultRoles",
                    "defaultRoles must contain a \"__default\" entry",
                )]
                .into(),
            })?;

        let mut all: BTreeSet<String> = exported.into_iter().map(str::to_string).collect();
        all.extend(config.roles.values().flatten().cloned());

        let domain_roles = config
            .default_roles
            .iter()
            .filter(|(domain, _)| domain.as_str() != DEFAULT_ROLE_KEY)
            .map(|(domain, role)| (domain.to_lowercase(), role.clone()))
            .collect();

        let index = Self {
            roles: config.roles.clone(),
            all: all.into_iter().collect(),
            superusers: config.superusers.iter().map(|e| e.to_lowercase()).collect(),
            domain_roles,
            default_role,
        };
        tracing::debug!(
            roles = index.roles.len(),
            permissions = index.all.len(),
            superusers = index.superusers.len(),
            "permission index built"
        );
        Ok(index)
    }

    /// Every known permission, sorted.
    pub fn all_permissions(&self) -> &[String] {
        &self.all
    }

    /// The configured permissions of a role, `None` for an unknown role.
    pub fn role(&self, role: &str) -> Option<&[String]> {
        self.roles.get(role).map(Vec::as_slice)
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.keys()
    }

    /// Whether the address, or any linked external address, is a superuser.
    /// Comparison is case-insensitive.
    pub fn is_superuser(&self, email: Option<&str>, linked: &[String]) -> bool {
        email
            .into_iter()
            .chain(linked.iter().map(String::as_str))
            .any(|address| self.superusers.contains(&address.trim().to_lowercase()))
    }

    /// Effective permissions of a user.
    ///
    /// Superusers get every permission regardless of role; everyone else
    /// gets exactly their role's list. An unknown or absent role yields an
    /// empty set.
    pub fn user_permissions(
        &self,
        email: Option<&str>,
        linked: &[String],
        role: Option<&str>,
    ) -> &[String] {
        if self.is_superuser(email, linked) {
            return &self.all;
        }
        role.and_then(|r| self.role(r)).unwrap_or_default()
    }

    pub fn has_permission(
        &self,
        email: Option<&str>,
        linked: &[String],
        role: Option<&str>,
        permission: &str,
    ) -> bool {
        self.user_permissions(email, linked, role)
            .iter()
            .any(|p| p == permission)
    }

    /// Role assigned to a new user: the e-mail domain (after the last `@`,
    /// case-insensitive) looked up in `defaultRoles`, else `__default`.
    pub fn default_role_by_email(&self, email: Option<&str>) -> &RoleId {
        email
            .and_then(|e| e.trim().rsplit_once('@'))
            .and_then(|(_, domain)| self.domain_roles.get(&domain.to_lowercase()))
            .unwrap_or(&self.default_role)
    }
}
