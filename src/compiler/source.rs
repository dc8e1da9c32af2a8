//! Contract source loading.

use std::fs;
use std::path::Path;

use crate::blockchain::types::{DeployError, DeployResult};

/// A Solidity source file read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSource {
    /// Final path component; the key used under `sources` in the compiler request.
    pub file_name: String,
    pub content: String,
}

/// Read a contract source file.
pub fn load_source(path: &Path) -> DeployResult<ContractSource> {
    let content = fs::read_to_string(path)
        .map_err(|e| DeployError::Io(format!("failed to read {}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DeployError::Io(format!("{} has no file name", path.display())))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded contract source");

    Ok(ContractSource { file_name, content })
}
