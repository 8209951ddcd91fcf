//! Filesystem locations the engine reads from.

use std::path::{Path, PathBuf};

use modhub_config::ConfigPaths;
use modhub_registry::ModuleRoots;

/// Default directory names under a project root.
pub const CONFIG_DIR: &str = "config";
pub const MODULES_DIR: &str = "modules";
pub const CUSTOM_MODULES_DIR: &str = "custom-modules";
pub const INTEGRATIONS_DIR: &str = "integrations";

/// Where configuration, modules and integrations live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub config_dir: PathBuf,
    pub modules_dir: PathBuf,
    /// Tenant-specific modules, searched before `modules_dir`.
    pub custom_modules_dir: Option<PathBuf>,
    pub integrations_dir: PathBuf,
}

impl EngineSettings {
    /// Conventional layout under `root`: `config/`, `modules/`,
    /// `custom-modules/` and `integrations/`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join(CONFIG_DIR),
            modules_dir: root.join(MODULES_DIR),
            custom_modules_dir: Some(root.join(CUSTOM_MODULES_DIR)),
            integrations_dir: root.join(INTEGRATIONS_DIR),
        }
    }

    pub fn config_paths(&self) -> ConfigPaths {
        ConfigPaths::new(&self.config_dir)
    }

    pub fn module_roots(&self) -> ModuleRoots {
        let roots = ModuleRoots::new(&self.modules_dir);
        match &self.custom_modules_dir {
            Some(custom) => roots.with_custom_root(custom),
            None => roots,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_root(".")
    }
}
