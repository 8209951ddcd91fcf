//! # Template Resolution & Rendering
//!
//! [`TemplateEngine`] owns every merged [`TemplateStore`] and the compiled
//! Handlebars registries. Templates are compiled once at load, so a syntax
//! error fails the load instead of the first send.
//!
//! Resolution prefers an office-specific variant: for a payload carrying
//! `office.id = "berlin"`, `eventApplicationOpened` first resolves
//! `eventApplicationOpenedBerlin` and falls back to the plain id. A template
//! missing from both is logged and yields `None`, which callers treat as
//! "do not send".

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use handlebars::{Handlebars, Template};
use serde::Serialize;
use serde_json::Value;

use modhub_core::case::pascal_case;
use modhub_core::{AppError, AppResult, ModuleId};

use crate::store::{TemplatePaths, TemplateKind, TemplateStore};

/// Suffix of the HTML body sub-template of an e-mail.
pub const EMAIL_HTML_SUFFIX: &str = "Html";
/// Suffix of the subject sub-template of an e-mail.
pub const EMAIL_SUBJECT_SUFFIX: &str = "Subject";

/// A rendered e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Per-module template lookup and rendering.
pub struct TemplateEngine {
    stores: BTreeMap<ModuleId, BTreeMap<TemplateKind, TemplateStore>>,
    /// HTML-escaping registry; e-mail templates only.
    html: Handlebars<'static>,
    /// Verbatim registry; every template.
    plain: Handlebars<'static>,
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("modules", &self.stores.keys().collect::<Vec<_>>())
            .field("templates", &self.template_count())
            .finish()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn registry_name(module: &str, kind: TemplateKind, template_id: &str) -> String {
    format!("{module}/{kind}/{template_id}")
}

fn office_id(payload: &Value) -> Option<&str> {
    payload
        .pointer("/office/id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut plain = Handlebars::new();
        plain.register_escape_fn(handlebars::no_escape);
        Self {
            stores: BTreeMap::new(),
            html: Handlebars::new(),
            plain,
        }
    }

    /// Load every kind of template for each `(module id, module dir)`,
    /// merging overrides from `<override_root>/<module id>/`.
    pub fn load<'a, I>(modules: I, override_root: &Path) -> AppResult<Self>
    where
        I: IntoIterator<Item = (&'a ModuleId, &'a Path)>,
    {
        let mut engine = Self::new();
        for (module_id, module_dir) in modules {
            let paths = TemplatePaths {
                module_dir: module_dir.to_path_buf(),
                override_dir: override_root.join(module_id.as_str()),
            };
            for kind in TemplateKind::ALL {
                let store =
                    TemplateStore::load(&paths.default_file(kind), &paths.override_file(kind))?;
                engine.insert(module_id.clone(), kind, store)?;
            }
        }
        tracing::debug!(templates = engine.template_count(), "templates compiled");
        Ok(engine)
    }

    /// Compile and install a store, replacing any previous store for the
    /// same module and kind. Templates of the previous store that the new
    /// one lacks are unregistered; an empty store removes the entry.
    ///
    /// # Errors
    ///
    /// [`AppError::TemplateSyntax`] for the first template that does not
    /// compile. The engine is unchanged on error.
    pub fn insert(
        &mut self,
        module_id: ModuleId,
        kind: TemplateKind,
        store: TemplateStore,
    ) -> AppResult<()> {
        let syntax = |template: &str, e: handlebars::TemplateError| AppError::TemplateSyntax {
            module_id: module_id.clone(),
            kind: kind.to_string(),
            template: template.to_string(),
            reason: e.to_string(),
        };
        let mut compiled = Vec::with_capacity(store.len());
        for (template_id, source) in store.iter() {
            let template = Template::compile(source).map_err(|e| syntax(template_id, e))?;
            compiled.push((registry_name(module_id.as_str(), kind, template_id), template));
        }

        let previous = self
            .stores
            .get_mut(&module_id)
            .and_then(|kinds| kinds.remove(&kind));
        if let Some(previous) = previous {
            for (template_id, _) in previous.iter() {
                let name = registry_name(module_id.as_str(), kind, template_id);
                self.plain.unregister_template(&name);
                self.html.unregister_template(&name);
            }
        }

        for (name, template) in compiled {
            if kind == TemplateKind::Email {
                self.html.register_template(&name, template.clone());
            }
            self.plain.register_template(&name, template);
        }

        if store.is_empty() {
            if self.stores.get(&module_id).is_some_and(BTreeMap::is_empty) {
                self.stores.remove(&module_id);
            }
        } else {
            self.stores
                .entry(module_id)
                .or_default()
                .insert(kind, store);
        }
        Ok(())
    }

    pub fn store(&self, module: &str, kind: TemplateKind) -> Option<&TemplateStore> {
        self.stores.get(module).and_then(|kinds| kinds.get(&kind))
    }

    pub fn template_count(&self) -> usize {
        self.stores
            .values()
            .flat_map(BTreeMap::values)
            .map(TemplateStore::len)
            .sum()
    }

    /// The template id that `template_id` resolves to for this payload,
    /// without logging.
    pub fn resolve(
        &self,
        module: &str,
        kind: TemplateKind,
        template_id: &str,
        payload: &Value,
    ) -> Option<String> {
        let store = self.store(module, kind)?;
        if let Some(office) = office_id(payload) {
            let specific = format!("{template_id}{}", pascal_case(office));
            if store.contains(&specific) {
                return Some(specific);
            }
        }
        store
            .contains(template_id)
            .then(|| template_id.to_string())
    }

    fn render_resolved(
        &self,
        module: &str,
        kind: TemplateKind,
        resolved: &str,
        payload: &Value,
        escape_html: bool,
    ) -> Option<String> {
        let registry = if escape_html { &self.html } else { &self.plain };
        let name = registry_name(module, kind, resolved);
        match registry.render(&name, payload) {
            Ok(rendered) => Some(rendered),
            Err(e) => {
                tracing::warn!(module, kind = %kind, template = resolved, error = %e, "template render failed");
                None
            }
        }
    }

    /// Resolve and render a template verbatim. Missing → `None` (logged).
    pub fn render(
        &self,
        module: &str,
        kind: TemplateKind,
        template_id: &str,
        payload: &Value,
    ) -> Option<String> {
        let Some(resolved) = self.resolve(module, kind, template_id, payload) else {
            tracing::warn!(module, kind = %kind, template = template_id, "template not found");
            return None;
        };
        self.render_resolved(module, kind, &resolved, payload, false)
    }

    /// Render `<id>Html` (HTML-escaped) and `<id>Subject`. A missing HTML
    /// body yields `None`; a missing subject renders as an empty string.
    pub fn email(&self, module: &str, template_id: &str, payload: &Value) -> Option<RenderedEmail> {
        let kind = TemplateKind::Email;
        let html_id = format!("{template_id}{EMAIL_HTML_SUFFIX}");
        let Some(html_resolved) = self.resolve(module, kind, &html_id, payload) else {
            tracing::warn!(module, template = %html_id, "e-mail template not found");
            return None;
        };
        let html = self.render_resolved(module, kind, &html_resolved, payload, true)?;

        let subject_id = format!("{template_id}{EMAIL_SUBJECT_SUFFIX}");
        let subject = self
            .resolve(module, kind, &subject_id, payload)
            .and_then(|resolved| self.render_resolved(module, kind, &resolved, payload, false))
            .unwrap_or_default();
        Some(RenderedEmail { subject, html })
    }

    pub fn notification(&self, module: &str, template_id: &str, payload: &Value) -> Option<String> {
        self.render(module, TemplateKind::Notification, template_id, payload)
    }

    pub fn text(&self, module: &str, template_id: &str, payload: &Value) -> Option<String> {
        self.render(module, TemplateKind::Text, template_id, payload)
    }

    pub fn error(&self, module: &str, template_id: &str, payload: &Value) -> Option<String> {
        self.render(module, TemplateKind::Error, template_id, payload)
    }
}
