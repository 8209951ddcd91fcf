//! # Module Registry
//!
//! Turns the operator's module list into resolved [`AppModule`]s:
//!
//! 1. Discover each enabled module's manifest in the custom root, then the
//!    default root. First match wins.
//! 2. Load and validate the manifest; its `id` must match the directory.
//! 3. Resolve capabilities through the [`ModuleCatalog`] and derive
//!    [`BuildProps`].
//! 4. Validate and narrow the module's metadata if it exports a schema.
//! 5. Check dependencies and portal references across the enabled set.
//!
//! Ordering is a separate step ([`order_modules`]) so that a missing
//! dependency is reported as such and not as a cycle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use modhub_config::{ConfigLoader, ModuleConfig, ModuleManifest};
use modhub_core::{AppError, AppResult, ModuleId};
use modhub_schema::SchemaId;

use crate::catalog::{BuildProps, CapabilitySource, ModuleCatalog, ModuleDescriptor};
use crate::resolver::resolve_order;

/// File name of a module manifest inside its directory.
pub const MODULE_MANIFEST_FILE: &str = "module.json";

/// The module search roots, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRoots {
    pub default_root: PathBuf,
    /// Tenant-specific modules; takes priority over `default_root`.
    pub custom_root: Option<PathBuf>,
}

impl ModuleRoots {
    /// Search only the bundled modules under `default_root`.
    pub fn new(default_root: impl Into<PathBuf>) -> Self {
        Self {
            default_root: default_root.into(),
            custom_root: None,
        }
    }

    /// Also search `custom_root`, ahead of the default root.
    pub fn with_custom_root(mut self, custom_root: impl Into<PathBuf>) -> Self {
        self.custom_root = Some(custom_root.into());
        self
    }

    /// `(root, is_custom)` in the order they are searched.
    pub fn search_order(&self) -> Vec<(&Path, bool)> {
        let mut roots = Vec::with_capacity(2);
        if let Some(custom) = &self.custom_root {
            roots.push((custom.as_path(), true));
        }
        roots.push((self.default_root.as_path(), false));
        roots
    }
}

/// An enabled module with everything known about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppModule {
    /// Operator config; `metadata` is already narrowed.
    pub config: ModuleConfig,
    pub manifest: ModuleManifest,
    pub descriptor: ModuleDescriptor,
    pub capability_source: CapabilitySource,
    pub build_props: BuildProps,
    /// Directory the manifest was found in.
    pub dir: PathBuf,
}

impl AppModule {
    /// The module id, as declared by its manifest.
    pub fn id(&self) -> &ModuleId {
        &self.manifest.id
    }

    /// Metadata from the module configuration, with schema defaults applied.
    pub fn metadata(&self) -> &Value {
        &self.config.metadata
    }
}

/// Discovers and assembles enabled modules.
pub struct ModuleRegistry<'a> {
    loader: &'a ConfigLoader,
    roots: &'a ModuleRoots,
    catalog: &'a ModuleCatalog,
}

impl<'a> ModuleRegistry<'a> {
    /// A registry searching `roots`, with capabilities from `catalog`.
    pub fn new(loader: &'a ConfigLoader, roots: &'a ModuleRoots, catalog: &'a ModuleCatalog) -> Self {
        Self {
            loader,
            roots,
            catalog,
        }
    }

    /// Locate a module's directory.
    ///
    /// # Errors
    ///
    /// [`AppError::ModuleNotFound`] listing every manifest path checked.
    pub fn discover(&self, id: &ModuleId) -> AppResult<(PathBuf, bool)> {
        let mut checked = Vec::with_capacity(2);
        for (root, custom) in self.roots.search_order() {
            let dir = root.join(id.as_str());
            let manifest = dir.join(MODULE_MANIFEST_FILE);
            if manifest.is_file() {
                return Ok((dir, custom));
            }
            checked.push(manifest);
        }
        Err(AppError::ModuleNotFound {
            module_id: id.clone(),
            checked,
        })
    }

    /// Load one enabled module.
    pub fn load_module(&self, config: &ModuleConfig) -> AppResult<AppModule> {
        let (dir, custom) = self.discover(&config.id)?;
        let path = dir.join(MODULE_MANIFEST_FILE);
        let manifest: ModuleManifest = self.loader.load(&path, SchemaId::ModuleManifest)?;
        if manifest.id != config.id {
            return Err(AppError::ManifestIdMismatch {
                expected: config.id.to_string(),
                found: manifest.id.to_string(),
                path,
            });
        }

        let (descriptor, capability_source) = self.catalog.describe(&manifest);
        let mut config = config.clone();
        if let Some(schema) = &descriptor.metadata_schema {
            config.metadata =
                self.loader
                    .validator()
                    .validate_metadata(&config.id, schema, &config.metadata)?;
        }
        let build_props = BuildProps::derive(&descriptor, custom);
        tracing::debug!(
            module = %config.id,
            dir = %dir.display(),
            custom,
            source = ?capability_source,
            "module loaded"
        );
        Ok(AppModule {
            config,
            manifest,
            descriptor,
            capability_source,
            build_props,
            dir,
        })
    }

    /// Load every enabled module (in list order) and check the references
    /// between them. Disabled modules are logged and skipped.
    pub fn load(&self, configs: &[ModuleConfig]) -> AppResult<Vec<AppModule>> {
        let disabled: Vec<&str> = configs
            .iter()
            .filter(|c| !c.enabled)
            .map(|c| c.id.as_str())
            .collect();
        if !disabled.is_empty() {
            tracing::warn!(modules = ?disabled, "disabled modules are ignored");
        }

        let modules = configs
            .iter()
            .filter(|c| c.enabled)
            .map(|c| self.load_module(c))
            .collect::<AppResult<Vec<_>>>()?;
        check_dependencies(&modules)?;
        check_portals(&modules)?;
        Ok(modules)
    }
}

/// Every dependency must be another enabled module.
///
/// # Errors
///
/// [`AppError::MissingDependency`] for the first unmet dependency.
pub fn check_dependencies(modules: &[AppModule]) -> AppResult<()> {
    for module in modules {
        for dependency in &module.manifest.dependencies {
            if !modules.iter().any(|m| m.id() == dependency) {
                return Err(AppError::MissingDependency {
                    module_id: module.id().clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Every portal entry must name an enabled module and one of its exported
/// components.
///
/// # Errors
///
/// [`AppError::InvalidPortalReference`] for the first bad reference.
pub fn check_portals(modules: &[AppModule]) -> AppResult<()> {
    let by_id: BTreeMap<&ModuleId, &AppModule> = modules.iter().map(|m| (m.id(), m)).collect();
    for module in modules {
        for (portal, references) in &module.config.portals {
            for reference in references {
                let reason = match by_id.get(&reference.module) {
                    None => Some("module is not enabled"),
                    Some(target) if target.descriptor.components.is_none() => {
                        Some("module exports no components")
                    }
                    Some(target) if !target.descriptor.exports_component(&reference.component) => {
                        Some("component is not exported by the module")
                    }
                    Some(_) => None,
                };
                if let Some(reason) = reason {
                    return Err(AppError::InvalidPortalReference {
                        module_id: module.id().clone(),
                        portal: portal.clone(),
                        reference: reference.to_string(),
                        reason: reason.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Sort modules so that each comes after its dependencies.
pub fn order_modules(modules: Vec<AppModule>) -> AppResult<Vec<AppModule>> {
    let order: Vec<String> = resolve_order(modules.iter().map(|m| {
        (
            m.id().as_str(),
            m.manifest.dependencies.iter().map(ModuleId::as_str),
        )
    }))?
    .into_iter()
    .map(str::to_string)
    .collect();

    let mut by_id: BTreeMap<String, AppModule> = modules
        .into_iter()
        .map(|m| (m.id().to_string(), m))
        .collect();
    let ordered: Vec<AppModule> = order.iter().filter_map(|id| by_id.remove(id)).collect();
    tracing::info!(order = ?order, "module order resolved");
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use modhub_schema::SchemaValidator;
    use serde_json::json;

    struct Tree {
        _dir: tempfile::TempDir,
        roots: ModuleRoots,
    }

    fn tree() -> Tree {
        let dir = tempfile::tempdir().unwrap();
        let roots = ModuleRoots::new(dir.path().join("modules"))
            .with_custom_root(dir.path().join("custom-modules"));
        Tree { _dir: dir, roots }
    }

    fn write_manifest(root: &Path, id: &str, manifest: Value) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MODULE_MANIFEST_FILE), manifest.to_string()).unwrap();
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new(Arc::new(SchemaValidator::new().unwrap()))
    }

    fn configs(value: Value) -> Vec<ModuleConfig> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_custom_root_wins() {
        let t = tree();
        write_manifest(&t.roots.default_root, "events", json!({ "id": "events", "name": "Default" }));
        write_manifest(
            t.roots.custom_root.as_ref().unwrap(),
            "events",
            json!({ "id": "events", "name": "Custom" }),
        );
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let registry = ModuleRegistry::new(&loader, &t.roots, &catalog);
        let modules = registry
            .load(&configs(json!([{ "id": "events", "enabled": true }])))
            .unwrap();
        assert_eq!(modules[0].manifest.name, "Custom");
        assert!(modules[0].build_props.custom);
    }

    #[test]
    fn test_module_not_found_lists_both_roots() {
        let t = tree();
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let registry = ModuleRegistry::new(&loader, &t.roots, &catalog);
        let err = registry
            .discover(&ModuleId::new("forms").unwrap())
            .unwrap_err();
        match err {
            AppError::ModuleNotFound { checked, .. } => {
                assert_eq!(checked.len(), 2);
                assert!(checked[0].starts_with(t.roots.custom_root.as_ref().unwrap()));
                assert!(checked[1].starts_with(&t.roots.default_root));
            }
            other => panic!("expected ModuleNotFound, got: {other}"),
        }
    }

    #[test]
    fn test_disabled_module_is_not_discovered() {
        let t = tree();
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let registry = ModuleRegistry::new(&loader, &t.roots, &catalog);
        let modules = registry
            .load(&configs(json!([{ "id": "ghost", "enabled": false }])))
            .unwrap();
        assert!(modules.is_empty());
    }

    #[test]
    fn test_manifest_id_mismatch() {
        let t = tree();
        write_manifest(&t.roots.default_root, "events", json!({ "id": "calendar", "name": "C" }));
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let err = ModuleRegistry::new(&loader, &t.roots, &catalog)
            .load(&configs(json!([{ "id": "events", "enabled": true }])))
            .unwrap_err();
        assert_eq!(err.kind(), "manifest_id_mismatch");
    }

    #[test]
    fn test_metadata_is_narrowed() {
        let t = tree();
        write_manifest(
            &t.roots.default_root,
            "events",
            json!({
                "id": "events",
                "name": "Events",
                "exports": {
                    "metadataSchema": {
                        "type": "object",
                        "properties": { "maxParticipants": { "type": "integer", "default": 50 } }
                    }
                }
            }),
        );
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let registry = ModuleRegistry::new(&loader, &t.roots, &catalog);
        let modules = registry
            .load(&configs(json!([{ "id": "events", "enabled": true }])))
            .unwrap();
        assert_eq!(modules[0].metadata(), &json!({ "maxParticipants": 50 }));
        assert!(modules[0].build_props.with_metadata_schema);

        let err = registry
            .load(&configs(json!([
                { "id": "events", "enabled": true, "metadata": { "maxParticipants": "lots" } }
            ])))
            .unwrap_err();
        assert!(err.to_string().starts_with("module 'events' metadata failed validation"));
    }

    #[test]
    fn test_registered_metadata_schema() {
        let t = tree();
        write_manifest(&t.roots.default_root, "visits", json!({ "id": "visits", "name": "Visits" }));
        let loader = loader();
        let mut catalog = ModuleCatalog::new();
        catalog.register(
            ModuleId::new("visits").unwrap(),
            ModuleDescriptor::new().with_metadata_schema(json!({
                "type": "object",
                "required": ["welcomeMessage"]
            })),
        );
        let err = ModuleRegistry::new(&loader, &t.roots, &catalog)
            .load(&configs(json!([{ "id": "visits", "enabled": true }])))
            .unwrap_err();
        assert_eq!(err.kind(), "schema_validation_error");
    }

    #[test]
    fn test_dependency_on_disabled_module() {
        let t = tree();
        write_manifest(
            &t.roots.default_root,
            "events",
            json!({ "id": "events", "name": "Events", "dependencies": ["calendar"] }),
        );
        write_manifest(&t.roots.default_root, "calendar", json!({ "id": "calendar", "name": "Cal" }));
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let err = ModuleRegistry::new(&loader, &t.roots, &catalog)
            .load(&configs(json!([
                { "id": "events", "enabled": true },
                { "id": "calendar", "enabled": false }
            ])))
            .unwrap_err();
        match err {
            AppError::MissingDependency { module_id, dependency } => {
                assert_eq!(module_id.as_str(), "events");
                assert_eq!(dependency.as_str(), "calendar");
            }
            other => panic!("expected MissingDependency, got: {other}"),
        }
    }

    #[test]
    fn test_portal_references() {
        let t = tree();
        write_manifest(
            &t.roots.default_root,
            "events",
            json!({ "id": "events", "name": "Events", "exports": { "components": ["EventCard"] } }),
        );
        write_manifest(&t.roots.default_root, "home", json!({ "id": "home", "name": "Home" }));
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let registry = ModuleRegistry::new(&loader, &t.roots, &catalog);

        let ok = registry.load(&configs(json!([
            { "id": "events", "enabled": true },
            { "id": "home", "enabled": true, "portals": {
                "dashboard": [{ "module": "events", "component": "EventCard" }]
            } }
        ])));
        assert!(ok.is_ok());

        for (reference, reason) in [
            (json!({ "module": "events", "component": "EventList" }), "not exported"),
            (json!({ "module": "home", "component": "Banner" }), "no components"),
            (json!({ "module": "forms", "component": "FormView" }), "not enabled"),
        ] {
            let err = registry
                .load(&configs(json!([
                    { "id": "events", "enabled": true },
                    { "id": "home", "enabled": true, "portals": { "dashboard": [reference] } }
                ])))
                .unwrap_err();
            assert_eq!(err.kind(), "invalid_portal_reference");
            assert!(err.to_string().contains(reason), "{err}");
        }
    }

    #[test]
    fn test_order_modules() {
        let t = tree();
        write_manifest(
            &t.roots.default_root,
            "events",
            json!({ "id": "events", "name": "Events", "dependencies": ["calendar"] }),
        );
        write_manifest(&t.roots.default_root, "calendar", json!({ "id": "calendar", "name": "Cal" }));
        let loader = loader();
        let catalog = ModuleCatalog::new();
        let modules = ModuleRegistry::new(&loader, &t.roots, &catalog)
            .load(&configs(json!([
                { "id": "events", "enabled": true },
                { "id": "calendar", "enabled": true }
            ])))
            .unwrap();
        let ordered = order_modules(modules).unwrap();
        let ids: Vec<_> = ordered.iter().map(|m| m.id().as_str()).collect();
        assert_eq!(ids, vec!["calendar", "events"]);
    }
}
