//! # Artifact Rendering
//!
//! Pure functions from the ordered module list to the text of each
//! generated TypeScript file. Output depends only on the input, so
//! rendering twice yields identical bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde_json::Value;

use modhub_config::Audience;
use modhub_core::case::{camel_case, pascal_case};
use modhub_registry::AppModule;

use crate::error::CodegenError;

/// First line of every generated file.
pub const GENERATED_MARKER: &str = "// @generated by modhub. Do not edit.";

pub const COMPONENTS_FILE: &str = "components.generated.ts";
pub const ROUTES_FILE: &str = "routes.generated.ts";
pub const PERMISSIONS_FILE: &str = "permissions.generated.ts";
pub const TYPES_FILE: &str = "types.generated.ts";

/// Routes present in every application: `(id, path, audience)`.
pub const DEFAULT_ROUTES: &[(&str, &str, Audience)] = &[
    ("home", "/", Audience::Public),
    ("login", "/login", Audience::Public),
    ("logout", "/logout", Audience::User),
    ("profile", "/profile", Audience::User),
    ("settings", "/admin/settings", Audience::Admin),
    ("notFound", "/404", Audience::Public),
];

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub contents: String,
}

/// Render all four artifacts.
///
/// # Errors
///
/// [`CodegenError::DuplicateRoute`] if two routes share an id, and
/// [`CodegenError::BindingCollision`] if two module or integration ids
/// generate the same identifier.
pub fn render_all(modules: &[AppModule]) -> Result<Vec<Artifact>, CodegenError> {
    check_bindings(modules)?;
    Ok(vec![
        Artifact {
            file_name: COMPONENTS_FILE,
            contents: render_components(modules),
        },
        Artifact {
            file_name: ROUTES_FILE,
            contents: render_routes(modules)?,
        },
        Artifact {
            file_name: PERMISSIONS_FILE,
            contents: render_permissions(modules),
        },
        Artifact {
            file_name: TYPES_FILE,
            contents: render_types(modules),
        },
    ])
}

/// A TypeScript string literal.
fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn module_import_path(module: &AppModule, entry: &str) -> String {
    let root = if module.build_props.custom {
        "@custom-modules"
    } else {
        "@modules"
    };
    format!("{root}/{}/{entry}", module.id())
}

fn binding(module_id: &str, suffix: &str) -> String {
    format!("{}{suffix}", camel_case(module_id))
}

fn integration_type(integration_id: &str) -> String {
    format!("{}Integration", pascal_case(integration_id))
}

/// Reject ids whose generated identifiers coincide, e.g. `room-reservation`
/// and `room_reservation`.
fn check_bindings(modules: &[AppModule]) -> Result<(), CodegenError> {
    fn claim<'a>(
        seen: &mut BTreeMap<String, &'a str>,
        binding: String,
        id: &'a str,
    ) -> Result<(), CodegenError> {
        if let Some(first) = seen.get(&binding).copied() {
            if first != id {
                return Err(CodegenError::BindingCollision {
                    binding,
                    first: first.to_string(),
                    second: id.to_string(),
                });
            }
        }
        seen.insert(binding, id);
        Ok(())
    }

    let mut seen = BTreeMap::new();
    for module in modules.iter().filter(|m| {
        let props = &m.build_props;
        props.with_components || props.with_permissions || props.with_types
    }) {
        let id = module.id().as_str();
        claim(&mut seen, camel_case(id), id)?;
    }

    let integrations: BTreeSet<&str> = modules
        .iter()
        .flat_map(|m| m.config.enabled_integrations.iter())
        .map(|id| id.as_str())
        .collect();
    for integration in integrations {
        claim(&mut seen, integration_type(integration), integration)?;
    }
    Ok(())
}

fn header() -> String {
    format!("{GENERATED_MARKER}\n\n")
}

/// Component namespaces of `withComponents` modules plus the portal table.
pub fn render_components(modules: &[AppModule]) -> String {
    let exporters: Vec<&AppModule> = modules
        .iter()
        .filter(|m| m.build_props.with_components)
        .collect();

    let mut out = header();
    for module in &exporters {
        let _ = writeln!(
            out,
            "import * as {} from {};",
            binding(module.id().as_str(), "Components"),
            quote(&module_import_path(module, "components"))
        );
    }
    if !exporters.is_empty() {
        out.push('\n');
    }

    out.push_str("export const moduleComponents = {\n");
    for module in &exporters {
        let _ = writeln!(
            out,
            "  {}: {},",
            quote(module.id().as_str()),
            binding(module.id().as_str(), "Components")
        );
    }
    out.push_str("} as const;\n\n");

    out.push_str("export const portals = {\n");
    for module in modules.iter().filter(|m| !m.config.portals.is_empty()) {
        let _ = writeln!(out, "  {}: {{", quote(module.id().as_str()));
        for (portal, references) in &module.config.portals {
            let _ = writeln!(out, "    {}: [", quote(portal));
            for reference in references {
                let _ = writeln!(
                    out,
                    "      {{ module: {}, component: {}[{}] }},",
                    quote(reference.module.as_str()),
                    binding(reference.module.as_str(), "Components"),
                    quote(&reference.component)
                );
            }
            out.push_str("    ],\n");
        }
        out.push_str("  },\n");
    }
    out.push_str("} as const;\n");
    out
}

struct RouteRow<'a> {
    id: &'a str,
    path: &'a str,
    audience: Audience,
    module: Option<&'a str>,
    component_id: Option<&'a str>,
    full_screen: bool,
    available_portals: &'a [String],
}

/// Default routes followed by every module route, in module order.
pub fn render_routes(modules: &[AppModule]) -> Result<String, CodegenError> {
    let mut rows: Vec<RouteRow<'_>> = DEFAULT_ROUTES
        .iter()
        .map(|&(id, path, audience)| RouteRow {
            id,
            path,
            audience,
            module: None,
            component_id: None,
            full_screen: false,
            available_portals: &[],
        })
        .collect();
    for module in modules {
        for (audience, id, route) in module.manifest.client_router.routes() {
            rows.push(RouteRow {
                id,
                path: &route.path,
                audience,
                module: Some(module.id().as_str()),
                component_id: Some(&route.component_id),
                full_screen: route.full_screen,
                available_portals: &route.available_portals,
            });
        }
    }

    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for row in &rows {
        let owner = row.module.unwrap_or("default routes");
        if let Some(first) = owners.insert(row.id, owner) {
            return Err(CodegenError::DuplicateRoute {
                route_id: row.id.to_string(),
                first: first.to_string(),
                second: owner.to_string(),
            });
        }
    }

    let opt = |v: Option<&str>| v.map_or_else(|| "null".to_string(), quote);

    let mut out = header();
    out.push_str("export const routes = {\n");
    for row in &rows {
        let _ = writeln!(out, "  {}: {},", quote(row.id), quote(row.path));
    }
    out.push_str("} as const;\n\n");
    out.push_str("export type RouteId = keyof typeof routes;\n\n");
    out.push_str(
        "export interface RouteDefinition {\n  \
         id: RouteId;\n  \
         path: string;\n  \
         audience: \"public\" | \"user\" | \"admin\";\n  \
         module: string | null;\n  \
         componentId: string | null;\n  \
         fullScreen: boolean;\n  \
         availablePortals: readonly string[];\n}\n\n",
    );
    out.push_str("export const routeDefinitions: readonly RouteDefinition[] = [\n");
    for row in &rows {
        let portals: Vec<String> = row.available_portals.iter().map(|p| quote(p)).collect();
        let _ = writeln!(
            out,
            "  {{ id: {}, path: {}, audience: {}, module: {}, componentId: {}, fullScreen: {}, availablePortals: [{}] }},",
            quote(row.id),
            quote(row.path),
            quote(row.audience.as_str()),
            opt(row.module),
            opt(row.component_id),
            row.full_screen,
            portals.join(", ")
        );
    }
    out.push_str("];\n");
    Ok(out)
}

/// Permission tables of `withPermissions` modules and the `Permission`
/// union of every exported permission.
pub fn render_permissions(modules: &[AppModule]) -> String {
    let exporters: Vec<&AppModule> = modules
        .iter()
        .filter(|m| m.build_props.with_permissions)
        .collect();

    let mut out = header();
    for module in &exporters {
        let _ = writeln!(
            out,
            "import {{ permissions as {} }} from {};",
            binding(module.id().as_str(), "Permissions"),
            quote(&module_import_path(module, "permissions"))
        );
    }
    if !exporters.is_empty() {
        out.push('\n');
        let names: Vec<String> = exporters
            .iter()
            .map(|m| binding(m.id().as_str(), "Permissions"))
            .collect();
        let _ = writeln!(out, "export {{ {} }};\n", names.join(", "));
    }

    out.push_str("export const modulePermissions = {\n");
    for module in &exporters {
        let _ = writeln!(
            out,
            "  {}: {},",
            quote(module.id().as_str()),
            binding(module.id().as_str(), "Permissions")
        );
    }
    out.push_str("} as const;\n\n");

    let all: BTreeSet<&str> = exporters
        .iter()
        .flat_map(|m| m.descriptor.permission_list())
        .map(String::as_str)
        .collect();
    if all.is_empty() {
        out.push_str("export type Permission = never;\n");
    } else {
        out.push_str("export type Permission =\n");
        for permission in &all {
            let _ = writeln!(out, "  | {}", quote(permission));
        }
        // Replace the final newline with the terminating semicolon.
        out.pop();
        out.push_str(";\n");
    }
    out
}

/// Model types of `withTypes` modules and one type per referenced
/// integration.
pub fn render_types(modules: &[AppModule]) -> String {
    let typed: Vec<&AppModule> = modules
        .iter()
        .filter(|m| m.build_props.with_types)
        .collect();
    let integrations: BTreeSet<&str> = modules
        .iter()
        .flat_map(|m| m.config.enabled_integrations.iter())
        .map(|id| id.as_str())
        .collect();

    let mut out = header();
    for module in &typed {
        let _ = writeln!(
            out,
            "import type * as {} from {};",
            binding(module.id().as_str(), "Types"),
            quote(&module_import_path(module, "types"))
        );
    }
    for integration in &integrations {
        let _ = writeln!(
            out,
            "import type {{ {} }} from {};",
            integration_type(integration),
            quote(&format!("@integrations/{integration}/types"))
        );
    }
    if !typed.is_empty() || !integrations.is_empty() {
        out.push('\n');
    }

    out.push_str("export interface ModelTypes {\n");
    for module in &typed {
        let namespace = binding(module.id().as_str(), "Types");
        let _ = writeln!(out, "  {}: {{", quote(module.id().as_str()));
        for name in module.descriptor.types.as_deref().unwrap_or_default() {
            let _ = writeln!(out, "    {}: {namespace}.{name};", quote(name));
        }
        out.push_str("  };\n");
    }
    out.push_str("}\n\n");

    out.push_str("export interface IntegrationTypes {\n");
    for integration in &integrations {
        let _ = writeln!(
            out,
            "  {}: {};",
            quote(integration),
            integration_type(integration)
        );
    }
    out.push_str("}\n");
    out
}
