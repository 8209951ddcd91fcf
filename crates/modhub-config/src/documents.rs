//! # Typed Configuration Documents
//!
//! The narrowed form of every JSON document the engine reads. Values reach
//! these types only after passing schema and rule validation, so field-level
//! invariants (non-empty names, identifier character sets, the mandatory
//! `__default` role) can be relied on by consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use modhub_core::{IntegrationId, ModuleId, OfficeId, RoleId};

/// Key in `defaultRoles` used when no e-mail domain matches.
pub const DEFAULT_ROLE_KEY: &str = "__default";

// ── app.json ─────────────────────────────────────────────────────────

/// Global application settings (`app.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Display name of the application.
    pub name: String,
    /// Enabled sign-in providers.
    pub auth_providers: Vec<AuthProvider>,
    /// Shell layout options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// Default locale, e.g. `en` or `de-DE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// A sign-in provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Microsoft,
    Credentials,
}

/// Shell layout options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub navigation: Navigation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    #[default]
    Top,
    Side,
}

// ── company.json ─────────────────────────────────────────────────────

/// Company and office settings (`company.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyConfig {
    pub name: String,
    pub offices: Vec<Office>,
}

impl CompanyConfig {
    /// Look up an office by id.
    pub fn office(&self, id: &str) -> Option<&Office> {
        self.offices.iter().find(|o| o.id.as_str() == id)
    }
}

/// One office (tenant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: OfficeId,
    pub name: String,
    /// IANA timezone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub allow_desk_reservation: bool,
    #[serde(default)]
    pub allow_room_reservation: bool,
    #[serde(default)]
    pub allow_guest_invitation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits_config: Option<VisitsConfig>,
    #[serde(default)]
    pub areas: Vec<Space>,
    #[serde(default)]
    pub rooms: Vec<Space>,
    /// Shown instead of a room list when rooms are booked elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms_placeholder_message: Option<String>,
}

/// Visit settings of an office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitsConfig {
    pub max_visitors_per_day: u32,
    #[serde(default)]
    pub require_host_approval: bool,
    /// Minutes before a booking at which check-in opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_opens_minutes: Option<u32>,
}

/// A bookable area or meeting room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    pub capacity: u32,
}

// ── permissions.json ─────────────────────────────────────────────────

/// Role definitions and default role assignment (`permissions.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsConfig {
    /// Role id → permissions, in configured order.
    pub roles: BTreeMap<RoleId, Vec<String>>,
    /// E-mail domain (or `__default`) → role id.
    pub default_roles: BTreeMap<String, RoleId>,
    /// E-mail addresses granted every permission.
    #[serde(default)]
    pub superusers: Vec<String>,
}

// ── modules.json ─────────────────────────────────────────────────────

/// One entry of the module enablement list (`modules.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    pub id: ModuleId,
    pub enabled: bool,
    #[serde(default)]
    pub enabled_integrations: Vec<IntegrationId>,
    /// Operator-supplied settings, validated against the module's own schema.
    #[serde(default = "empty_object")]
    pub metadata: Value,
    /// Extension point name → ordered component references.
    #[serde(default)]
    pub portals: BTreeMap<String, Vec<ComponentRef>>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Reference to a component exported by another module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentRef {
    pub module: ModuleId,
    pub component: String,
}

impl std::fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.module, self.component)
    }
}

// ── module.json ──────────────────────────────────────────────────────

/// A module's self-description (`<root>/<id>/module.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    pub id: ModuleId,
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<ModuleId>,
    #[serde(default)]
    pub recommended_integrations: Vec<IntegrationId>,
    #[serde(default)]
    pub required_integrations: Vec<IntegrationId>,
    /// Data model names contributed by the module.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub client_router: ClientRouter,
    /// Static capability table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<ManifestExports>,
}

impl ModuleManifest {
    /// Whether `integration` is listed as required or recommended.
    pub fn supports_integration(&self, integration: &IntegrationId) -> bool {
        self.required_integrations.contains(integration)
            || self.recommended_integrations.contains(integration)
    }
}

/// Who a client route is served to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Public,
    User,
    Admin,
}

impl Audience {
    pub const ALL: [Audience; 3] = [Audience::Public, Audience::User, Audience::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Client route tables, keyed by route id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRouter {
    #[serde(default)]
    pub public: BTreeMap<String, Route>,
    #[serde(default)]
    pub user: BTreeMap<String, Route>,
    #[serde(default)]
    pub admin: BTreeMap<String, Route>,
}

impl ClientRouter {
    /// The route table of one audience.
    pub fn table(&self, audience: Audience) -> &BTreeMap<String, Route> {
        match audience {
            Audience::Public => &self.public,
            Audience::User => &self.user,
            Audience::Admin => &self.admin,
        }
    }

    /// Every route as `(audience, route id, route)`, audiences in
    /// public/user/admin order and ids sorted within each.
    pub fn routes(&self) -> impl Iterator<Item = (Audience, &str, &Route)> {
        Audience::ALL.into_iter().flat_map(move |audience| {
            self.table(audience)
                .iter()
                .map(move |(id, route)| (audience, id.as_str(), route))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.user.is_empty() && self.admin.is_empty()
    }
}

/// A client route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: String,
    pub component_id: String,
    #[serde(default)]
    pub full_screen: bool,
    #[serde(default)]
    pub available_portals: Vec<String>,
}

/// Author-declared capabilities. An absent list means "not provided",
/// an empty list means "provided, but empty".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExports {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_schema: Option<Value>,
}

// ── integration.json ─────────────────────────────────────────────────

/// An integration's self-description (`<root>/<id>/integration.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationManifest {
    pub id: IntegrationId,
    pub name: String,
    /// Environment variable names that must be set and non-empty.
    pub credentials: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_config_defaults() {
        let cfg: ModuleConfig = serde_json::from_value(json!({
            "id": "events",
            "enabled": true
        }))
        .unwrap();
        assert!(cfg.enabled_integrations.is_empty());
        assert_eq!(cfg.metadata, json!({}));
        assert!(cfg.portals.is_empty());
    }

    #[test]
    fn test_manifest_routes_iterate_by_audience() {
        let manifest: ModuleManifest = serde_json::from_value(json!({
            "id": "events",
            "name": "Events",
            "clientRouter": {
                "admin": { "eventAdmin": { "path": "/admin/events", "componentId": "EventAdmin" } },
                "user": {
                    "eventList": { "path": "/events", "componentId": "EventList" },
                    "eventDetail": { "path": "/events/:id", "componentId": "EventDetail", "fullScreen": true }
                }
            }
        }))
        .unwrap();
        let ids: Vec<_> = manifest
            .client_router
            .routes()
            .map(|(audience, id, _)| (audience, id))
            .collect();
        assert_eq!(
            ids,
            vec![
                (Audience::User, "eventDetail"),
                (Audience::User, "eventList"),
                (Audience::Admin, "eventAdmin"),
            ]
        );
    }

    #[test]
    fn test_exports_distinguish_absent_from_empty() {
        let exports: ManifestExports =
            serde_json::from_value(json!({ "components": [] })).unwrap();
        assert_eq!(exports.components, Some(vec![]));
        assert_eq!(exports.permissions, None);
    }

    #[test]
    fn test_supports_integration() {
        let manifest: ModuleManifest = serde_json::from_value(json!({
            "id": "events",
            "name": "Events",
            "requiredIntegrations": ["matrix"],
            "recommendedIntegrations": ["slack"]
        }))
        .unwrap();
        for (id, expected) in [("matrix", true), ("slack", true), ("teams", false)] {
            let id = IntegrationId::new(id).unwrap();
            assert_eq!(manifest.supports_integration(&id), expected);
        }
    }

    #[test]
    fn test_office_lookup() {
        let company: CompanyConfig = serde_json::from_value(json!({
            "name": "Acme",
            "offices": [{ "id": "berlin", "name": "Berlin" }]
        }))
        .unwrap();
        assert!(company.office("berlin").is_some());
        assert!(company.office("paris").is_none());
        assert!(!company.offices[0].allow_desk_reservation);
    }
}
