//! # Config Loader
//!
//! Reads a JSON document from disk, validates it against its schema and
//! cross-field rules, and narrows it into a typed value. Every failure is
//! mapped to a distinct [`AppError`] variant so that the operator sees
//! whether the file is missing, unreadable, malformed, or invalid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use modhub_core::{AppError, AppResult};
use modhub_schema::{SchemaId, SchemaValidator};

use crate::documents::{AppConfig, CompanyConfig, ModuleConfig, PermissionsConfig};

/// File name of the application settings.
pub const APP_FILE: &str = "app.json";
/// File name of the company settings.
pub const COMPANY_FILE: &str = "company.json";
/// File name of the permission settings.
pub const PERMISSIONS_FILE: &str = "permissions.json";
/// File name of the module enablement list.
pub const MODULES_FILE: &str = "modules.json";
/// Directory holding template overrides.
pub const TEMPLATES_DIR: &str = "templates";

/// The fixed file set under a configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Paths under the configuration directory `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configuration directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `app.json`.
    pub fn app(&self) -> PathBuf {
        self.root.join(APP_FILE)
    }

    /// Path of `company.json`.
    pub fn company(&self) -> PathBuf {
        self.root.join(COMPANY_FILE)
    }

    /// Path of `permissions.json`.
    pub fn permissions(&self) -> PathBuf {
        self.root.join(PERMISSIONS_FILE)
    }

    /// Path of `modules.json`.
    pub fn modules(&self) -> PathBuf {
        self.root.join(MODULES_FILE)
    }

    /// Root of the per-module template overrides
    /// (`templates/<module>/<kind>.yaml`).
    pub fn templates(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }
}

/// The four top-level configuration documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSet {
    pub app: AppConfig,
    pub company: CompanyConfig,
    pub permissions: PermissionsConfig,
    pub modules: Vec<ModuleConfig>,
}

/// Loads and validates configuration documents.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    validator: Arc<SchemaValidator>,
}

impl ConfigLoader {
    /// A loader validating against `validator`.
    pub fn new(validator: Arc<SchemaValidator>) -> Self {
        Self { validator }
    }

    /// The validator shared with other load stages.
    pub fn validator(&self) -> &Arc<SchemaValidator> {
        &self.validator
    }

    /// Read, parse, validate and narrow one document.
    ///
    /// # Errors
    ///
    /// - [`AppError::ConfigNotFound`] if `path` does not exist.
    /// - [`AppError::ConfigUnreadable`] for any other read failure.
    /// - [`AppError::ConfigParse`] if the file is not valid JSON.
    /// - [`AppError::SchemaValidation`] listing every violation.
    pub fn load<T: DeserializeOwned>(&self, path: &Path, schema: SchemaId) -> AppResult<T> {
        let value = read_json(path)?;
        let typed = self
            .validator
            .validate_typed(schema, value)
            .map_err(|violations| AppError::SchemaValidation {
                subject: path.display().to_string(),
                violations,
            })?;
        tracing::debug!(path = %path.display(), schema = %schema, "configuration loaded");
        Ok(typed)
    }

    /// Load the four top-level documents, stopping at the first failure.
    pub fn load_all(&self, paths: &ConfigPaths) -> AppResult<ConfigSet> {
        let app: AppConfig = self.load(&paths.app(), SchemaId::App)?;
        let company: CompanyConfig = self.load(&paths.company(), SchemaId::Company)?;
        let permissions: PermissionsConfig =
            self.load(&paths.permissions(), SchemaId::Permissions)?;
        let modules: Vec<ModuleConfig> = self.load(&paths.modules(), SchemaId::Modules)?;
        tracing::info!(
            root = %paths.root().display(),
            offices = company.offices.len(),
            roles = permissions.roles.len(),
            modules = modules.len(),
            "configuration set loaded"
        );
        Ok(ConfigSet {
            app,
            company,
            permissions,
            modules,
        })
    }
}

/// Read a file into a string, mapping I/O failures to configuration errors.
pub fn read_file(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => AppError::ConfigUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })
}

/// Read and parse a JSON file without validating it.
pub fn read_json(path: &Path) -> AppResult<Value> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|e| AppError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loader() -> ConfigLoader {
        ConfigLoader::new(Arc::new(SchemaValidator::new().unwrap()))
    }

    fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader()
            .load::<AppConfig>(&dir.path().join(APP_FILE), SchemaId::App)
            .unwrap_err();
        assert_eq!(err.kind(), "config_not_found");
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let path = dir.path().join(APP_FILE);
        fs::create_dir(&path).unwrap();
        let err = loader().load::<AppConfig>(&path, SchemaId::App).unwrap_err();
        assert_eq!(err.kind(), "config_unreadable");
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_FILE);
        fs::write(&path, "{ \"name\": ").unwrap();
        let err = loader().load::<AppConfig>(&path, SchemaId::App).unwrap_err();
        assert_eq!(err.kind(), "config_parse_error");
    }

    #[test]
    fn test_schema_violation_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), APP_FILE, &json!({ "name": "Hub" }));
        let err = loader().load::<AppConfig>(&path, SchemaId::App).unwrap_err();
        match err {
            AppError::SchemaValidation { subject, violations } => {
                assert!(subject.ends_with(APP_FILE));
                assert!(violations.to_string().contains("authProviders"));
            }
            other => panic!("expected SchemaValidation, got: {other}"),
        }
    }

    #[test]
    fn test_load_typed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            APP_FILE,
            &json!({ "name": "Hub", "authProviders": ["google", "credentials"] }),
        );
        let app: AppConfig = loader().load(&path, SchemaId::App).unwrap();
        assert_eq!(app.name, "Hub");
        assert_eq!(app.auth_providers.len(), 2);
    }

    #[test]
    fn test_load_all_stops_at_first_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            APP_FILE,
            &json!({ "name": "Hub", "authProviders": ["google"] }),
        );
        let err = loader()
            .load_all(&ConfigPaths::new(dir.path()))
            .unwrap_err();
        match err {
            AppError::ConfigNotFound { path } => assert!(path.ends_with(COMPANY_FILE)),
            other => panic!("expected ConfigNotFound, got: {other}"),
        }
    }
}
