//! Persisting the compiler response for later inspection.

use std::fs;
use std::path::Path;

use crate::blockchain::types::{DeployError, DeployResult};
use crate::compiler::output::CompilerOutput;

/// Write the full compiler response as JSON, replacing any existing file.
pub fn write_artifact(path: &Path, output: &CompilerOutput) -> DeployResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| DeployError::Io(format!("failed to create {}: {}", parent.display(), e)))?;
    }

    let json = serde_json::to_vec_pretty(output.raw())
        .map_err(|e| DeployError::Io(format!("failed to serialize artifact: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| DeployError::Io(format!("failed to write {}: {}", path.display(), e)))?;

    tracing::info!(path = %path.display(), "Wrote compiler artifact");
    Ok(())
}

/// Read an artifact written by [`write_artifact`].
pub fn read_artifact(path: &Path) -> DeployResult<CompilerOutput> {
    let bytes = fs::read(path)
        .map_err(|e| DeployError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    CompilerOutput::from_slice(&bytes)
}
