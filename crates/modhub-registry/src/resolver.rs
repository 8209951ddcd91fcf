//! # Dependency Resolver
//!
//! Orders modules so that every module comes after all of its dependencies.
//!
//! The sort is an explicit fixed-point loop: each pass moves every pending
//! node whose dependencies are all resolved into the output, in input order.
//! A pass that moves nothing means the remainder cannot be ordered (a cycle,
//! or a dependency on an id outside the input), and the whole remainder is
//! reported. No partial order is ever returned.

use std::collections::HashSet;

use modhub_core::{AppError, AppResult};

/// Sort `(id, dependencies)` pairs leaves-first.
///
/// Nodes that become resolvable in the same pass keep their relative input
/// order, so the output is deterministic for a given input.
///
/// # Errors
///
/// [`AppError::DependencyCycle`] listing every unresolved id, sorted.
pub fn resolve_order<'a, I, D>(graph: I) -> AppResult<Vec<&'a str>>
where
    I: IntoIterator<Item = (&'a str, D)>,
    D: IntoIterator<Item = &'a str>,
{
    let mut pending: Vec<(&'a str, Vec<&'a str>)> = graph
        .into_iter()
        .map(|(id, deps)| (id, deps.into_iter().collect()))
        .collect();
    let mut resolved: HashSet<&'a str> = HashSet::with_capacity(pending.len());
    let mut order = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let before = pending.len();
        let mut next = Vec::with_capacity(before);
        let mut ready = Vec::new();
        for (id, deps) in pending {
            if deps.iter().all(|d| resolved.contains(d)) {
                ready.push(id);
            } else {
                next.push((id, deps));
            }
        }
        // A pass only sees nodes resolved in earlier passes.
        resolved.extend(ready.iter().copied());
        order.extend(ready);
        pending = next;

        if pending.len() == before {
            let mut unresolved: Vec<String> =
                pending.iter().map(|(id, _)| (*id).to_string()).collect();
            unresolved.sort();
            unresolved.dedup();
            tracing::error!(unresolved = ?unresolved, "module dependencies cannot be ordered");
            return Err(AppError::DependencyCycle { unresolved });
        }
    }
    Ok(order)
}
