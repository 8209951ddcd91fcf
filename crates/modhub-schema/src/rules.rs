//! # Cross-Field Rules
//!
//! Business rules that a JSON Schema cannot express cleanly ("if X is true
//! then Y is required, unless Z"). Each rule is a named predicate plus the
//! message reported when the predicate does not hold. Rules run after
//! structural validation and append to the same violation collection; a
//! failing rule never stops the remaining rules from running.
//!
//! Predicates must tolerate structurally invalid input: they are evaluated
//! even when the schema pass already reported errors.

use std::collections::HashSet;

use serde_json::Value;

use modhub_core::{ValidationViolations, Violation};

use crate::SchemaId;

/// Which part of a document a rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// The whole document.
    Root,
    /// Every element of the array at the given JSON Pointer.
    EachItem(&'static str),
}

/// A named predicate + message pair.
#[derive(Debug, Clone, Copy)]
pub struct CrossFieldRule {
    /// Stable rule name, reported with every violation.
    pub name: &'static str,
    /// Where the predicate is applied.
    pub scope: RuleScope,
    /// Returns `true` when the rule is satisfied.
    pub holds: fn(&Value) -> bool,
    /// Plain-language description of the violated rule.
    pub message: &'static str,
}

impl CrossFieldRule {
    /// Evaluate the rule against `document`, appending one violation per
    /// failing target.
    pub fn evaluate(&self, document: &Value, out: &mut ValidationViolations) {
        match self.scope {
            RuleScope::Root => {
                if !(self.holds)(document) {
                    out.push(Violation::rule(self.name, "", self.message));
                }
            }
            RuleScope::EachItem(pointer) => {
                let Some(items) = document.pointer(pointer).and_then(Value::as_array) else {
                    return;
                };
                for (i, item) in items.iter().enumerate() {
                    if !(self.holds)(item) {
                        out.push(Violation::rule(
                            self.name,
                            format!("{pointer}/{i}"),
                            self.message,
                        ));
                    }
                }
            }
        }
    }
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn non_empty_array(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_array)
        .is_some_and(|a| !a.is_empty())
}

fn non_empty_str(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn string_list<'a>(value: &'a Value, key: &str) -> Vec<&'a str> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn unique_strings<'a>(values: impl Iterator<Item = Option<&'a str>>) -> bool {
    let mut seen = HashSet::new();
    values.flatten().all(|v| seen.insert(v))
}

/// Office-level rules of the company document.
pub const COMPANY_RULES: &[CrossFieldRule] = &[
    CrossFieldRule {
        name: "desk-reservation-requires-visits-and-areas",
        scope: RuleScope::EachItem("/offices"),
        holds: |office| {
            !flag(office, "allowDeskReservation")
                || (office.get("visitsConfig").is_some_and(Value::is_object)
                    && non_empty_array(office, "areas"))
        },
        message: "allowDeskReservation is true, so visitsConfig and a non-empty areas array are required",
    },
    CrossFieldRule {
        name: "room-reservation-requires-rooms-or-placeholder",
        scope: RuleScope::EachItem("/offices"),
        holds: |office| {
            !flag(office, "allowRoomReservation")
                || non_empty_array(office, "rooms")
                || non_empty_str(office, "roomsPlaceholderMessage")
        },
        message: "allowRoomReservation is true, so either a non-empty rooms array or a non-empty roomsPlaceholderMessage is required",
    },
    CrossFieldRule {
        name: "guest-invitation-requires-desk-reservation",
        scope: RuleScope::EachItem("/offices"),
        holds: |office| {
            !flag(office, "allowGuestInvitation") || flag(office, "allowDeskReservation")
        },
        message: "allowGuestInvitation is true, so allowDeskReservation must also be true",
    },
    CrossFieldRule {
        name: "unique-office-ids",
        scope: RuleScope::Root,
        holds: |company| match company.get("offices").and_then(Value::as_array) {
            Some(offices) => {
                unique_strings(offices.iter().map(|o| o.get("id").and_then(Value::as_str)))
            }
            None => true,
        },
        message: "every office id must be unique",
    },
];

/// Rules of the permissions document.
pub const PERMISSIONS_RULES: &[CrossFieldRule] = &[CrossFieldRule {
    name: "default-roles-reference-known-roles",
    scope: RuleScope::Root,
    holds: |config| {
        let (Some(roles), Some(defaults)) = (
            config.get("roles").and_then(Value::as_object),
            config.get("defaultRoles").and_then(Value::as_object),
        ) else {
            return true;
        };
        defaults
            .values()
            .filter_map(Value::as_str)
            .all(|role| roles.contains_key(role))
    },
    message: "every role referenced by defaultRoles must be declared in roles",
}];

/// Rules of the module enablement list.
pub const MODULES_RULES: &[CrossFieldRule] = &[CrossFieldRule {
    name: "unique-module-ids",
    scope: RuleScope::Root,
    holds: |modules| match modules.as_array() {
        Some(entries) => {
            unique_strings(entries.iter().map(|m| m.get("id").and_then(Value::as_str)))
        }
        None => true,
    },
    message: "every module id may appear only once in the module list",
}];

/// Rules of a module manifest.
pub const MODULE_MANIFEST_RULES: &[CrossFieldRule] = &[
    CrossFieldRule {
        name: "no-self-dependency",
        scope: RuleScope::Root,
        holds: |manifest| {
            let Some(id) = manifest.get("id").and_then(Value::as_str) else {
                return true;
            };
            !manifest
                .get("dependencies")
                .and_then(Value::as_array)
                .is_some_and(|deps| deps.iter().any(|d| d.as_str() == Some(id)))
        },
        message: "a module must not list itself in dependencies",
    },
    CrossFieldRule {
        name: "integration-lists-disjoint",
        scope: RuleScope::Root,
        holds: |manifest| {
            let required = string_list(manifest, "requiredIntegrations");
            string_list(manifest, "recommendedIntegrations")
                .iter()
                .all(|id| !required.contains(id))
        },
        message: "an integration cannot be both required and recommended",
    },
];

/// The rule set registered for a schema.
pub fn rules_for(schema: SchemaId) -> &'static [CrossFieldRule] {
    match schema {
        SchemaId::Company => COMPANY_RULES,
        SchemaId::Permissions => PERMISSIONS_RULES,
        SchemaId::Modules => MODULES_RULES,
        SchemaId::ModuleManifest => MODULE_MANIFEST_RULES,
        SchemaId::App | SchemaId::IntegrationManifest => &[],
    }
}

/// Evaluate every rule registered for `schema` against `document`.
pub fn evaluate_rules(schema: SchemaId, document: &Value) -> ValidationViolations {
    let mut out = ValidationViolations::new();
    for rule in rules_for(schema) {
        rule.evaluate(document, &mut out);
    }
    out
}
