//! # Snapshot
//!
//! The complete result of one successful load. Snapshots are immutable and
//! shared behind an `Arc`; a reload builds a new one and swaps it in.

use chrono::{DateTime, Utc};
use serde::Serialize;

use modhub_config::{ConfigSet, IntegrationManifest};
use modhub_registry::{AppModule, PermissionIndex};
use modhub_template::TemplateEngine;

/// Everything derived from one consistent configuration state.
#[derive(Debug)]
pub struct Snapshot {
    /// Incremented on every successful load, starting at 1.
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub config: ConfigSet,
    /// Enabled modules, leaves first.
    pub modules: Vec<AppModule>,
    /// Every integration referenced by an enabled module, sorted by id.
    pub integrations: Vec<IntegrationManifest>,
    pub permissions: PermissionIndex,
    pub templates: TemplateEngine,
}

impl Snapshot {
    pub fn module(&self, id: &str) -> Option<&AppModule> {
        self.modules.iter().find(|m| m.id().as_str() == id)
    }

    /// Module ids in dependency order.
    pub fn module_order(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.id().as_str()).collect()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            generation: self.generation,
            loaded_at: self.loaded_at,
            app: self.config.app.name.clone(),
            company: self.config.company.name.clone(),
            offices: self.config.company.offices.len(),
            modules: self.module_order().into_iter().map(str::to_string).collect(),
            integrations: self
                .integrations
                .iter()
                .map(|i| i.id.as_str().to_string())
                .collect(),
            permissions: self.permissions.all_permissions().to_vec(),
            templates: self.templates.template_count(),
        }
    }
}

/// Counts and ids describing a snapshot, for status output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub app: String,
    pub company: String,
    pub offices: usize,
    pub modules: Vec<String>,
    pub integrations: Vec<String>,
    pub permissions: Vec<String>,
    pub templates: usize,
}
