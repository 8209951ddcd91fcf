//! # Writing and Checking Artifacts
//!
//! Files are written through a temporary file in the output directory and
//! renamed into place, so a reader never observes a half-written file.
//! [`check`] compares on-disk bytes against freshly rendered ones without
//! touching the directory.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::CodegenError;
use crate::render::Artifact;

/// A generated file whose on-disk contents differ from the rendered ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleArtifact {
    pub file_name: &'static str,
    pub expected_digest: String,
    /// `None` if the file does not exist.
    pub found_digest: Option<String>,
}

/// Write every artifact into `out_dir`, creating it if needed.
///
/// # Errors
///
/// [`CodegenError::Io`] naming the path that could not be written.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<(), CodegenError> {
    fs::create_dir_all(out_dir).map_err(|source| CodegenError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    for artifact in artifacts {
        let path = out_dir.join(artifact.file_name);
        let io_err = |source| CodegenError::Io {
            path: path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(out_dir).map_err(io_err)?;
        tmp.write_all(artifact.contents.as_bytes()).map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        tracing::debug!(path = %path.display(), bytes = artifact.contents.len(), "wrote generated file");
    }
    tracing::info!(
        out_dir = %out_dir.display(),
        files = artifacts.len(),
        "generated sources written"
    );
    Ok(())
}

/// Artifacts in `out_dir` that are missing or differ from `artifacts`.
pub fn check(out_dir: &Path, artifacts: &[Artifact]) -> Vec<StaleArtifact> {
    artifacts
        .iter()
        .filter_map(|artifact| {
            let existing = fs::read(out_dir.join(artifact.file_name)).ok();
            if existing.as_deref() == Some(artifact.contents.as_bytes()) {
                return None;
            }
            Some(StaleArtifact {
                file_name: artifact.file_name,
                expected_digest: sha256_hex(artifact.contents.as_bytes()),
                found_digest: existing.as_deref().map(sha256_hex),
            })
        })
        .collect()
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}
