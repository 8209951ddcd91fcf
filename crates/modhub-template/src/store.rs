//! # Template Stores
//!
//! A [`TemplateStore`] is the template-id → source map of one module and
//! one [`TemplateKind`], merged from two YAML files:
//!
//! - default: `<module dir>/templates/<kind>.yaml`
//! - override: `<config dir>/templates/<module id>/<kind>.yaml`
//!
//! Override entries replace defaults with the same id; defaults absent from
//! the override are kept. A missing file is an empty source.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use modhub_config::read_file;
use modhub_core::{AppError, AppResult};

/// Directory holding a module's default templates.
pub const MODULE_TEMPLATES_DIR: &str = "templates";

/// The four template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Email,
    Notification,
    Text,
    Error,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Email,
        TemplateKind::Notification,
        TemplateKind::Text,
        TemplateKind::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Notification => "notification",
            Self::Text => "text",
            Self::Error => "error",
        }
    }

    /// YAML file name, e.g. `email.yaml`.
    pub fn file_name(self) -> String {
        format!("{}.yaml", self.as_str())
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown template kind '{s}' (expected email, notification, text or error)"))
    }
}

/// Merged templates of one module and kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateStore {
    templates: BTreeMap<String, String>,
}

impl TemplateStore {
    /// Merge `overrides` on top of `defaults`.
    pub fn merged(defaults: BTreeMap<String, String>, overrides: BTreeMap<String, String>) -> Self {
        let mut templates = defaults;
        templates.extend(overrides);
        Self { templates }
    }

    /// Load and merge the default and override files.
    pub fn load(default_file: &Path, override_file: &Path) -> AppResult<Self> {
        Ok(Self::merged(
            read_template_file(default_file)?,
            read_template_file(override_file)?,
        ))
    }

    pub fn get(&self, template_id: &str) -> Option<&str> {
        self.templates.get(template_id).map(String::as_str)
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.contains_key(template_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Template file locations for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePaths {
    /// The module's own directory.
    pub module_dir: PathBuf,
    /// `<config dir>/templates/<module id>`.
    pub override_dir: PathBuf,
}

impl TemplatePaths {
    pub fn default_file(&self, kind: TemplateKind) -> PathBuf {
        self.module_dir.join(MODULE_TEMPLATES_DIR).join(kind.file_name())
    }

    pub fn override_file(&self, kind: TemplateKind) -> PathBuf {
        self.override_dir.join(kind.file_name())
    }
}

/// Read a YAML map of template id → source. A missing file is empty.
///
/// # Errors
///
/// - [`AppError::ConfigUnreadable`] if the file exists but cannot be read.
/// - [`AppError::ConfigParse`] if it is not a map of strings.
pub fn read_template_file(path: &Path) -> AppResult<BTreeMap<String, String>> {
    let content = match read_file(path) {
        Ok(content) => content,
        Err(AppError::ConfigNotFound { .. }) => return Ok(BTreeMap::new()),
        Err(e) => return Err(e),
    };
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let parsed: Option<BTreeMap<String, String>> =
        serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(parsed.unwrap_or_default())
}
