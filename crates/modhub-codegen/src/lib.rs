//! # modhub-codegen — Generated Sources
//!
//! Renders the aggregator sources the client build imports: component
//! namespaces and portal tables, the route table, permission tables and
//! model/integration types for the enabled modules.
//!
//! Rendering is a pure function of the ordered module list; [`write_artifacts`]
//! and [`check`] handle the filesystem side. Every file starts with
//! [`GENERATED_MARKER`].

pub mod error;
pub mod output;
pub mod render;

pub use error::CodegenError;
pub use output::{check, sha256_hex, write_artifacts, StaleArtifact};
pub use render::{
    render_all, Artifact, COMPONENTS_FILE, DEFAULT_ROUTES, GENERATED_MARKER, PERMISSIONS_FILE,
    ROUTES_FILE, TYPES_FILE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use serde_json::{json, Value};

    use modhub_config::{ModuleConfig, ModuleManifest};
    use modhub_registry::{AppModule, BuildProps, CapabilitySource, ModuleDescriptor};

    fn module(config: Value, manifest: Value, custom: bool) -> AppModule {
        let manifest: ModuleManifest = serde_json::from_value(manifest).unwrap();
        let descriptor = manifest
            .exports
            .as_ref()
            .map(ModuleDescriptor::from)
            .unwrap_or_default();
        let build_props = BuildProps::derive(&descriptor, custom);
        AppModule {
            config: serde_json::from_value::<ModuleConfig>(config).unwrap(),
            dir: PathBuf::from(format!("modules/{}", manifest.id)),
            manifest,
            descriptor,
            capability_source: CapabilitySource::Manifest,
            build_props,
        }
    }

    fn fixture() -> Vec<AppModule> {
        vec![
            module(
                json!({ "id": "core", "enabled": true }),
                json!({
                    "id": "core",
                    "name": "Core",
                    "exports": { "components": ["Avatar"], "permissions": ["core.admin"] }
                }),
                false,
            ),
            module(
                json!({
                    "id": "room-reservation",
                    "enabled": true,
                    "enabledIntegrations": ["google-calendar"],
                    "portals": { "sidebar": [{ "module": "core", "component": "Avatar" }] }
                }),
                json!({
                    "id": "room-reservation",
                    "name": "Rooms",
                    "dependencies": ["core"],
                    "clientRouter": {
                        "user": { "rooms": { "path": "/rooms", "componentId": "RoomList" } },
                        "admin": {
                            "roomSettings": {
                                "path": "/admin/rooms",
                                "componentId": "RoomSettings",
                                "fullScreen": true,
                                "availablePortals": ["sidebar"]
                            }
                        }
                    },
                    "exports": {
                        "components": ["RoomList", "RoomSettings"],
                        "permissions": ["rooms.book", "rooms.manage"],
                        "types": ["Room", "Booking"]
                    }
                }),
                true,
            ),
        ]
    }

    fn contents<'a>(artifacts: &'a [Artifact], name: &str) -> &'a str {
        &artifacts
            .iter()
            .find(|a| a.file_name == name)
            .unwrap()
            .contents
    }

    #[test]
    fn test_every_file_starts_with_marker() {
        let artifacts = render_all(&fixture()).unwrap();
        assert_eq!(artifacts.len(), 4);
        for artifact in &artifacts {
            assert_eq!(artifact.contents.lines().next(), Some(GENERATED_MARKER));
        }
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let modules = fixture();
        assert_eq!(render_all(&modules).unwrap(), render_all(&modules).unwrap());
    }

    #[test]
    fn test_components_use_module_roots() {
        let artifacts = render_all(&fixture()).unwrap();
        let components = contents(&artifacts, COMPONENTS_FILE);
        assert!(components.contains(r#"import * as coreComponents from "@modules/core/components";"#));
        assert!(components.contains(
            r#"import * as roomReservationComponents from "@custom-modules/room-reservation/components";"#
        ));
        assert!(components.contains(r#"{ module: "core", component: coreComponents["Avatar"] },"#));
    }

    #[test]
    fn test_routes_include_defaults_and_modules() {
        let artifacts = render_all(&fixture()).unwrap();
        let routes = contents(&artifacts, ROUTES_FILE);
        assert!(routes.contains(r#"  "home": "/","#));
        assert!(routes.contains(r#"  "rooms": "/rooms","#));
        assert!(routes.contains("export type RouteId = keyof typeof routes;"));
        assert!(routes.contains(
            r#"{ id: "roomSettings", path: "/admin/rooms", audience: "admin", module: "room-reservation", componentId: "RoomSettings", fullScreen: true, availablePortals: ["sidebar"] },"#
        ));
        let home = routes.find(r#""home""#).unwrap();
        let rooms = routes.find(r#""rooms""#).unwrap();
        assert!(home < rooms);
    }

    #[test]
    fn test_duplicate_route_id() {
        let mut modules = fixture();
        modules.push(module(
            json!({ "id": "visits", "enabled": true }),
            json!({
                "id": "visits",
                "name": "Visits",
                "clientRouter": { "public": { "rooms": { "path": "/visit-rooms", "componentId": "X" } } }
            }),
            false,
        ));
        match render_all(&modules).unwrap_err() {
            CodegenError::DuplicateRoute {
                route_id,
                first,
                second,
            } => {
                assert_eq!(route_id, "rooms");
                assert_eq!(first, "room-reservation");
                assert_eq!(second, "visits");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_module_route_cannot_shadow_default() {
        let modules = vec![module(
            json!({ "id": "visits", "enabled": true }),
            json!({
                "id": "visits",
                "name": "Visits",
                "clientRouter": { "user": { "profile": { "path": "/me", "componentId": "Me" } } }
            }),
            false,
        )];
        assert!(matches!(
            render_all(&modules),
            Err(CodegenError::DuplicateRoute { .. })
        ));
    }

    #[test]
    fn test_permission_union() {
        let artifacts = render_all(&fixture()).unwrap();
        let permissions = contents(&artifacts, PERMISSIONS_FILE);
        assert!(permissions.contains("export { corePermissions, roomReservationPermissions };"));
        assert!(permissions.ends_with(
            "export type Permission =\n  | \"core.admin\"\n  | \"rooms.book\"\n  | \"rooms.manage\";\n"
        ));

        let empty = render_all(&[]).unwrap();
        assert!(contents(&empty, PERMISSIONS_FILE).contains("export type Permission = never;"));
    }

    #[test]
    fn test_types_include_integrations() {
        let artifacts = render_all(&fixture()).unwrap();
        let types = contents(&artifacts, TYPES_FILE);
        assert!(types.contains(
            r#"import type * as roomReservationTypes from "@custom-modules/room-reservation/types";"#
        ));
        assert!(types.contains(r#"    "Booking": roomReservationTypes.Booking;"#));
        assert!(!types.contains("roomReservationTypes["));
        assert!(types.contains(
            r#"import type { GoogleCalendarIntegration } from "@integrations/google-calendar/types";"#
        ));
        assert!(types.contains(r#"  "google-calendar": GoogleCalendarIntegration;"#));
        assert!(!types.contains("coreTypes"));
    }

    #[test]
    fn test_module_ids_with_same_binding_are_rejected() {
        let mut modules = fixture();
        modules.push(module(
            json!({ "id": "room_reservation", "enabled": true }),
            json!({
                "id": "room_reservation",
                "name": "Rooms (legacy)",
                "exports": { "components": ["LegacyRoomList"] }
            }),
            false,
        ));
        match render_all(&modules).unwrap_err() {
            CodegenError::BindingCollision {
                binding,
                first,
                second,
            } => {
                assert_eq!(binding, "roomReservation");
                assert_eq!(first, "room-reservation");
                assert_eq!(second, "room_reservation");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_integration_ids_with_same_type_are_rejected() {
        let mut modules = fixture();
        modules.push(module(
            json!({ "id": "visits", "enabled": true, "enabledIntegrations": ["googleCalendar"] }),
            json!({ "id": "visits", "name": "Visits" }),
            false,
        ));
        match render_all(&modules).unwrap_err() {
            CodegenError::BindingCollision { binding, .. } => {
                assert_eq!(binding, "GoogleCalendarIntegration");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_module_without_exports_does_not_claim_binding() {
        let mut modules = fixture();
        modules.push(module(
            json!({ "id": "room_reservation", "enabled": true }),
            json!({ "id": "room_reservation", "name": "Rooms (legacy)" }),
            false,
        ));
        assert!(render_all(&modules).is_ok());
    }

    #[test]
    fn test_write_then_check_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = render_all(&fixture()).unwrap();
        write_artifacts(dir.path(), &artifacts).unwrap();
        assert!(check(dir.path(), &artifacts).is_empty());

        let regenerated = render_all(&fixture()).unwrap();
        assert!(check(dir.path(), &regenerated).is_empty());
    }
}
