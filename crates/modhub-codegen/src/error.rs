use std::path::PathBuf;

use thiserror::Error;

/// Errors from rendering or writing generated sources.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// Two routes share an id across all audiences and modules.
    #[error("duplicate route id '{route_id}' declared by {first} and {second}")]
    DuplicateRoute {
        route_id: String,
        first: String,
        second: String,
    },

    /// Two ids map to the same TypeScript identifier.
    #[error("ids '{first}' and '{second}' both generate the identifier '{binding}'")]
    BindingCollision {
        binding: String,
        first: String,
        second: String,
    },

    #[error("failed to write generated file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
