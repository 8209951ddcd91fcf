//! # Engine Handle
//!
//! [`Engine`] runs the load pipeline and publishes the result as an
//! immutable [`Snapshot`]. It is constructed once at process start and
//! passed by reference to every consumer; there is no global instance.
//!
//! ## Pipeline
//!
//! 1. Load `app.json`, `company.json`, `permissions.json`, `modules.json`.
//! 2. Discover and assemble enabled modules.
//! 3. Order modules leaves-first.
//! 4. Check integrations and credentials.
//! 5. Build the permission index.
//! 6. Load and compile templates.
//!
//! ## Reload semantics
//!
//! Reloads are serialized by a single-flight mutex. A reload builds the new
//! snapshot off to the side and swaps it in only on success. On an
//! [`AppError`] the previous snapshot stays current and the error is
//! stored for [`Engine::last_error`]. Readers hold an `Arc` and never wait
//! for reload I/O.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use modhub_config::ConfigLoader;
use modhub_core::{AppError, AppResult};
use modhub_registry::{
    order_modules, CredentialSource, IntegrationValidator, ModuleCatalog, ModuleRegistry,
    PermissionIndex, ProcessEnv,
};
use modhub_schema::{SchemaError, SchemaValidator};
use modhub_template::TemplateEngine;

use crate::settings::EngineSettings;
use crate::snapshot::Snapshot;

/// Credential lookups shared across threads.
pub type SharedCredentials = Arc<dyn CredentialSource + Send + Sync>;

/// Long-lived engine handle.
pub struct Engine {
    settings: EngineSettings,
    loader: ConfigLoader,
    catalog: ModuleCatalog,
    credentials: SharedCredentials,
    current: RwLock<Option<Arc<Snapshot>>>,
    last_error: RwLock<Option<AppError>>,
    reload_lock: Mutex<()>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("catalog", &self.catalog)
            .field(
                "generation",
                &self.current.read().as_ref().map(|s| s.generation),
            )
            .field("last_error", &*self.last_error.read())
            .finish()
    }
}

impl Engine {
    /// Create an engine reading credentials from the process environment.
    /// Nothing is loaded until [`Engine::reload`] is called.
    ///
    /// # Errors
    ///
    /// [`SchemaError`] if an embedded schema fails to compile.
    pub fn new(settings: EngineSettings) -> Result<Self, SchemaError> {
        let validator = Arc::new(SchemaValidator::new()?);
        Ok(Self {
            settings,
            loader: ConfigLoader::new(validator),
            catalog: ModuleCatalog::new(),
            credentials: Arc::new(ProcessEnv),
            current: RwLock::new(None),
            last_error: RwLock::new(None),
            reload_lock: Mutex::new(()),
        })
    }

    /// Use explicit capability registrations.
    pub fn with_catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Read integration credentials from `credentials`.
    pub fn with_credentials(mut self, credentials: SharedCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The current snapshot, `None` until the first successful load.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// The error of the most recent failed reload, cleared by a successful
    /// one.
    pub fn last_error(&self) -> Option<AppError> {
        self.last_error.read().clone()
    }

    /// Whether a snapshot is available.
    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Run the load pipeline and publish the result.
    ///
    /// # Errors
    ///
    /// The pipeline's [`AppError`]; the previous snapshot is kept.
    pub fn reload(&self) -> AppResult<Arc<Snapshot>> {
        let _flight = self.reload_lock.lock();
        let generation = self
            .current
            .read()
            .as_ref()
            .map_or(1, |s| s.generation + 1);

        match self.build_snapshot(generation) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write() = Some(Arc::clone(&snapshot));
                *self.last_error.write() = None;
                tracing::info!(
                    generation,
                    modules = snapshot.modules.len(),
                    integrations = snapshot.integrations.len(),
                    templates = snapshot.templates.template_count(),
                    "configuration loaded"
                );
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!(
                    kind = e.kind(),
                    error = %e,
                    kept_generation = generation - 1,
                    "configuration reload failed; keeping previous state"
                );
                *self.last_error.write() = Some(e.clone());
                Err(e)
            }
        }
    }

    fn build_snapshot(&self, generation: u64) -> AppResult<Snapshot> {
        let paths = self.settings.config_paths();
        let config = self.loader.load_all(&paths)?;

        let roots = self.settings.module_roots();
        let registry = ModuleRegistry::new(&self.loader, &roots, &self.catalog);
        let modules = order_modules(registry.load(&config.modules)?)?;

        let integrations = IntegrationValidator::new(
            &self.loader,
            &self.settings.integrations_dir,
            self.credentials.as_ref(),
        )
        .validate(modules.iter().map(|m| (&m.config, &m.manifest)))?;

        let permissions = PermissionIndex::new(
            &config.permissions,
            modules
                .iter()
                .flat_map(|m| m.descriptor.permission_list())
                .map(String::as_str),
        )?;

        let templates = TemplateEngine::load(
            modules.iter().map(|m| (m.id(), m.dir.as_path())),
            &paths.templates(),
        )?;

        Ok(Snapshot {
            generation,
            loaded_at: Utc::now(),
            config,
            modules,
            integrations,
            permissions,
            templates,
        })
    }
}
