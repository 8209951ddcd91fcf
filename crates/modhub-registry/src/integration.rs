//! # Integration Validator
//!
//! Cross-checks the integrations each module declares against what the
//! operator enabled, then loads every referenced integration manifest once
//! and verifies that its credentials are present.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use modhub_config::{ConfigLoader, IntegrationManifest, ModuleConfig, ModuleManifest, MODULES_FILE};
use modhub_core::{AppError, AppResult, IntegrationId};
use modhub_schema::SchemaId;

/// File name of an integration manifest inside its directory.
pub const INTEGRATION_MANIFEST_FILE: &str = "integration.json";

/// Source of credential values, keyed by environment variable name.
pub trait CredentialSource {
    /// The value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;

    /// Whether `name` is set to a non-empty value.
    fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// Check a module's enabled integrations against its manifest.
///
/// # Errors
///
/// - [`AppError::MissingIntegration`] if a required integration is not
///   enabled.
/// - [`AppError::UnsupportedIntegration`] if an enabled integration is
///   neither required nor recommended.
pub fn check_module_integrations(
    config: &ModuleConfig,
    manifest: &ModuleManifest,
) -> AppResult<()> {
    let missing: Vec<IntegrationId> = manifest
        .required_integrations
        .iter()
        .filter(|id| !config.enabled_integrations.contains(id))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(AppError::MissingIntegration {
            module_id: config.id.clone(),
            missing,
            config_file: MODULES_FILE.to_string(),
        });
    }

    let unsupported: Vec<IntegrationId> = config
        .enabled_integrations
        .iter()
        .filter(|id| !manifest.supports_integration(id))
        .cloned()
        .collect();
    if !unsupported.is_empty() {
        return Err(AppError::UnsupportedIntegration {
            module_id: config.id.clone(),
            unsupported,
            config_file: MODULES_FILE.to_string(),
        });
    }
    Ok(())
}

/// Loads integration manifests and checks their credentials.
pub struct IntegrationValidator<'a> {
    loader: &'a ConfigLoader,
    root: &'a Path,
    credentials: &'a dyn CredentialSource,
}

impl<'a> IntegrationValidator<'a> {
    pub fn new(
        loader: &'a ConfigLoader,
        root: &'a Path,
        credentials: &'a dyn CredentialSource,
    ) -> Self {
        Self {
            loader,
            root,
            credentials,
        }
    }

    /// Path of an integration's manifest.
    pub fn manifest_path(&self, id: &IntegrationId) -> PathBuf {
        self.root.join(id.as_str()).join(INTEGRATION_MANIFEST_FILE)
    }

    /// Validate every enabled module's integrations, then load each
    /// referenced integration once (sorted by id) and verify its
    /// credentials.
    pub fn validate<'m, I>(&self, modules: I) -> AppResult<Vec<IntegrationManifest>>
    where
        I: IntoIterator<Item = (&'m ModuleConfig, &'m ModuleManifest)>,
    {
        let mut referenced: BTreeSet<&'m IntegrationId> = BTreeSet::new();
        for (config, manifest) in modules {
            check_module_integrations(config, manifest)?;
            referenced.extend(config.enabled_integrations.iter());
        }

        let mut manifests = Vec::with_capacity(referenced.len());
        for id in referenced {
            let path = self.manifest_path(id);
            let manifest: IntegrationManifest =
                self.loader.load(&path, SchemaId::IntegrationManifest)?;
            if &manifest.id != id {
                return Err(AppError::ManifestIdMismatch {
                    expected: id.to_string(),
                    found: manifest.id.to_string(),
                    path,
                });
            }
            self.check_credentials(&manifest)?;
            tracing::debug!(integration = %id, "integration credentials present");
            manifests.push(manifest);
        }
        Ok(manifests)
    }

    /// # Errors
    ///
    /// [`AppError::MissingCredential`] naming every missing variable.
    pub fn check_credentials(&self, manifest: &IntegrationManifest) -> AppResult<()> {
        let missing: Vec<String> = manifest
            .credentials
            .iter()
            .filter(|name| !self.credentials.is_present(name))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingCredential {
                integration_id: manifest.id.clone(),
                missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use modhub_schema::SchemaValidator;
    use serde_json::json;

    fn module(config: serde_json::Value, manifest: serde_json::Value) -> (ModuleConfig, ModuleManifest) {
        (
            serde_json::from_value(config).unwrap(),
            serde_json::from_value(manifest).unwrap(),
        )
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new(Arc::new(SchemaValidator::new().unwrap()))
    }

    fn write_integration(root: &Path, id: &str, credentials: &[&str]) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(INTEGRATION_MANIFEST_FILE),
            json!({ "id": id, "name": id, "credentials": credentials }).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_required_integration_not_enabled() {
        let (config, manifest) = module(
            json!({ "id": "events", "enabled": true, "enabledIntegrations": [] }),
            json!({ "id": "events", "name": "Events", "requiredIntegrations": ["matrix"] }),
        );
        let err = check_module_integrations(&config, &manifest).unwrap_err();
        match &err {
            AppError::MissingIntegration { missing, config_file, .. } => {
                assert_eq!(missing[0].as_str(), "matrix");
                assert_eq!(config_file, MODULES_FILE);
            }
            other => panic!("expected MissingIntegration, got: {other}"),
        }
        assert!(err.to_string().contains("matrix"));
    }

    #[test]
    fn test_unsupported_integration() {
        let (config, manifest) = module(
            json!({ "id": "events", "enabled": true, "enabledIntegrations": ["matrix", "slack"] }),
            json!({ "id": "events", "name": "Events", "recommendedIntegrations": ["matrix"] }),
        );
        let err = check_module_integrations(&config, &manifest).unwrap_err();
        match err {
            AppError::UnsupportedIntegration { unsupported, .. } => {
                assert_eq!(unsupported.len(), 1);
                assert_eq!(unsupported[0].as_str(), "slack");
            }
            other => panic!("expected UnsupportedIntegration, got: {other}"),
        }
    }

    #[test]
    fn test_recommended_integration_is_optional() {
        let (config, manifest) = module(
            json!({ "id": "events", "enabled": true }),
            json!({ "id": "events", "name": "Events", "recommendedIntegrations": ["matrix"] }),
        );
        check_module_integrations(&config, &manifest).unwrap();
    }

    #[test]
    fn test_missing_and_empty_credentials() {
        let dir = tempfile::tempdir().unwrap();
        write_integration(dir.path(), "matrix", &["MATRIX_URL", "MATRIX_TOKEN", "MATRIX_ROOM"]);
        let (config, manifest) = module(
            json!({ "id": "events", "enabled": true, "enabledIntegrations": ["matrix"] }),
            json!({ "id": "events", "name": "Events", "requiredIntegrations": ["matrix"] }),
        );
        let env = BTreeMap::from([
            ("MATRIX_URL".to_string(), "https://matrix.example".to_string()),
            ("MATRIX_TOKEN".to_string(), "  ".to_string()),
        ]);
        let loader = loader();
        let validator = IntegrationValidator::new(&loader, dir.path(), &env);
        let err = validator.validate([(&config, &manifest)]).unwrap_err();
        match err {
            AppError::MissingCredential { integration_id, missing } => {
                assert_eq!(integration_id.as_str(), "matrix");
                assert_eq!(missing, vec!["MATRIX_TOKEN", "MATRIX_ROOM"]);
            }
            other => panic!("expected MissingCredential, got: {other}"),
        }
    }

    #[test]
    fn test_shared_integration_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        write_integration(dir.path(), "matrix", &["MATRIX_TOKEN"]);
        write_integration(dir.path(), "brevo", &[]);
        let (events_cfg, events) = module(
            json!({ "id": "events", "enabled": true, "enabledIntegrations": ["matrix", "brevo"] }),
            json!({ "id": "events", "name": "Events", "recommendedIntegrations": ["matrix", "brevo"] }),
        );
        let (visits_cfg, visits) = module(
            json!({ "id": "visits", "enabled": true, "enabledIntegrations": ["matrix"] }),
            json!({ "id": "visits", "name": "Visits", "requiredIntegrations": ["matrix"] }),
        );
        let env = BTreeMap::from([("MATRIX_TOKEN".to_string(), "secret".to_string())]);
        let loader = loader();
        let manifests = IntegrationValidator::new(&loader, dir.path(), &env)
            .validate([(&events_cfg, &events), (&visits_cfg, &visits)])
            .unwrap();
        let ids: Vec<_> = manifests.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["brevo", "matrix"]);
    }

    #[test]
    fn test_missing_integration_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let (config, manifest) = module(
            json!({ "id": "events", "enabled": true, "enabledIntegrations": ["matrix"] }),
            json!({ "id": "events", "name": "Events", "requiredIntegrations": ["matrix"] }),
        );
        let env: BTreeMap<String, String> = BTreeMap::new();
        let loader = loader();
        let err = IntegrationValidator::new(&loader, dir.path(), &env)
            .validate([(&config, &manifest)])
            .unwrap_err();
        assert_eq!(err.kind(), "config_not_found");
    }
}
