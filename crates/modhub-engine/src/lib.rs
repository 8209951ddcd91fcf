//! # modhub-engine — Engine Handle
//!
//! Ties the workspace together: [`Engine::reload`] runs configuration
//! loading, module resolution, integration checks, permission aggregation
//! and template compilation, then publishes an immutable [`Snapshot`].
//!
//! ```no_run
//! use modhub_engine::{Engine, EngineSettings};
//!
//! let engine = Engine::new(EngineSettings::from_root("/srv/hub")).expect("embedded schemas");
//! match engine.reload() {
//!     Ok(snapshot) => println!("modules: {:?}", snapshot.module_order()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod engine;
pub mod settings;
pub mod snapshot;

pub use engine::{Engine, SharedCredentials};
pub use settings::EngineSettings;
pub use snapshot::{Snapshot, SnapshotSummary};
