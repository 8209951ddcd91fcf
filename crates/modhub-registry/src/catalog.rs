//! # Module Capability Catalog
//!
//! What a module exports (client components, a permission table, server
//! model types, a metadata schema) is declared, never probed. A compiled-in
//! module registers a [`ModuleDescriptor`] with the [`ModuleCatalog`];
//! any module without a registration falls back to the static `exports`
//! table of its manifest. [`BuildProps`] are derived from the descriptor.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use modhub_config::{ManifestExports, ModuleManifest};
use modhub_core::ModuleId;

/// Optional capabilities of one module.
///
/// `None` means the capability is not implemented; `Some(vec![])` means it
/// is implemented but currently empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub components: Option<Vec<String>>,
    pub permissions: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub metadata_schema: Option<Value>,
}

impl ModuleDescriptor {
    /// A descriptor with no capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the exported components.
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = Some(components.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the exported permissions.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the exported model types.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the JSON Schema for the module's `metadata`.
    pub fn with_metadata_schema(mut self, schema: Value) -> Self {
        self.metadata_schema = Some(schema);
        self
    }

    /// Whether `component` is among the exported components.
    pub fn exports_component(&self, component: &str) -> bool {
        self.components
            .as_deref()
            .is_some_and(|c| c.iter().any(|name| name == component))
    }

    /// Exported permissions, empty when the capability is absent.
    pub fn permission_list(&self) -> &[String] {
        self.permissions.as_deref().unwrap_or_default()
    }
}

impl From<&ManifestExports> for ModuleDescriptor {
    fn from(exports: &ManifestExports) -> Self {
        Self {
            components: exports.components.clone(),
            permissions: exports.permissions.clone(),
            types: exports.types.clone(),
            metadata_schema: exports.metadata_schema.clone(),
        }
    }
}

/// Code-generation flags derived from a descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProps {
    pub with_components: bool,
    pub with_permissions: bool,
    pub with_types: bool,
    pub with_metadata_schema: bool,
    /// Discovered in the custom (override) module root.
    pub custom: bool,
}

impl BuildProps {
    /// Build flags for a module with this descriptor.
    pub fn derive(descriptor: &ModuleDescriptor, custom: bool) -> Self {
        Self {
            with_components: descriptor.components.is_some(),
            with_permissions: descriptor.permissions.is_some(),
            with_types: descriptor.types.is_some(),
            with_metadata_schema: descriptor.metadata_schema.is_some(),
            custom,
        }
    }
}

/// Where a module's descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySource {
    /// Explicit [`ModuleCatalog::register`] call.
    Registered,
    /// The manifest's `exports` table.
    Manifest,
    /// Neither; the module exports nothing.
    None,
}

/// Explicit capability registrations, keyed by module id.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    entries: BTreeMap<ModuleId, ModuleDescriptor>,
}

impl ModuleCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, returning any previous registration.
    pub fn register(
        &mut self,
        module_id: ModuleId,
        descriptor: ModuleDescriptor,
    ) -> Option<ModuleDescriptor> {
        self.entries.insert(module_id, descriptor)
    }

    /// The registered descriptor of `module_id`, if any.
    pub fn get(&self, module_id: &ModuleId) -> Option<&ModuleDescriptor> {
        self.entries.get(module_id)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the descriptor for a loaded manifest.
    pub fn describe(&self, manifest: &ModuleManifest) -> (ModuleDescriptor, CapabilitySource) {
        if let Some(registered) = self.entries.get(&manifest.id) {
            return (registered.clone(), CapabilitySource::Registered);
        }
        match &manifest.exports {
            Some(exports) => (ModuleDescriptor::from(exports), CapabilitySource::Manifest),
            None => (ModuleDescriptor::default(), CapabilitySource::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: Value) -> ModuleManifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_registration_wins_over_manifest_exports() {
        let m = manifest(json!({
            "id": "events",
            "name": "Events",
            "exports": { "components": ["EventList"] }
        }));
        let mut catalog = ModuleCatalog::new();
        catalog.register(
            m.id.clone(),
            ModuleDescriptor::new().with_permissions(["events.manage"]),
        );
        let (descriptor, source) = catalog.describe(&m);
        assert_eq!(source, CapabilitySource::Registered);
        assert_eq!(descriptor.components, None);
        assert_eq!(descriptor.permission_list(), ["events.manage"]);
    }

    #[test]
    fn test_manifest_exports_fallback() {
        let m = manifest(json!({
            "id": "forms",
            "name": "Forms",
            "exports": { "components": ["FormView"], "types": [] }
        }));
        let (descriptor, source) = ModuleCatalog::new().describe(&m);
        assert_eq!(source, CapabilitySource::Manifest);
        let props = BuildProps::derive(&descriptor, false);
        assert!(props.with_components);
        assert!(props.with_types);
        assert!(!props.with_permissions);
        assert!(!props.with_metadata_schema);
        assert!(descriptor.exports_component("FormView"));
        assert!(!descriptor.exports_component("FormEdit"));
    }

    #[test]
    fn test_no_exports() {
        let m = manifest(json!({ "id": "core", "name": "Core" }));
        let (descriptor, source) = ModuleCatalog::new().describe(&m);
        assert_eq!(source, CapabilitySource::None);
        assert_eq!(BuildProps::derive(&descriptor, true), BuildProps {
            custom: true,
            ..BuildProps::default()
        });
        assert!(descriptor.permission_list().is_empty());
    }

    #[test]
    fn test_register_returns_previous() {
        let mut catalog = ModuleCatalog::new();
        let id = ModuleId::new("events").unwrap();
        assert!(catalog.register(id.clone(), ModuleDescriptor::new()).is_none());
        assert!(catalog
            .register(id, ModuleDescriptor::new().with_types(["Event"]))
            .is_some());
        assert_eq!(catalog.len(), 1);
    }
}
