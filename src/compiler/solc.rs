//! Solidity compiler backed by an svm-managed `solc` binary.

use async_trait::async_trait;
use semver::Version;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::blockchain::types::{DeployError, DeployResult};
use crate::compiler::input::CompilerInput;
use crate::compiler::output::CompilerOutput;

/// Request/response seam around the compiler toolchain.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile a standard JSON request.
    ///
    /// Error-severity diagnostics fail with `Compilation` carrying the
    /// toolchain's text.
    async fn compile(&self, input: &CompilerInput) -> DeployResult<CompilerOutput>;
}

/// A pinned solc release, installed through svm on first use.
#[derive(Debug, Clone)]
pub struct SvmSolc {
    version: Version,
}

impl SvmSolc {
    pub fn new(version: Version) -> Self {
        Self { version }
    }

    pub fn parse(version: &str) -> DeployResult<Self> {
        let version = Version::parse(version).map_err(|e| {
            DeployError::Compilation(format!("invalid solc version '{}': {}", version, e))
        })?;
        Ok(Self::new(version))
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Make sure the pinned release is available and return its binary path.
    ///
    /// A no-op when svm already has the version.
    pub async fn ensure_installed(&self) -> DeployResult<PathBuf> {
        let installed = svm::installed_versions().unwrap_or_default();
        if installed.contains(&self.version) {
            tracing::debug!(version = %self.version, "solc already installed");
            return Ok(svm::version_binary(&self.version.to_string()));
        }

        tracing::info!(version = %self.version, "Installing solc");
        svm::install(&self.version).await.map_err(|e| {
            DeployError::Compilation(format!("failed to install solc {}: {}", self.version, e))
        })
    }
}

#[async_trait]
impl Compiler for SvmSolc {
    #[tracing::instrument(skip_all, fields(version = %self.version))]
    async fn compile(&self, input: &CompilerInput) -> DeployResult<CompilerOutput> {
        let solc = self.ensure_installed().await?;
        let request = serde_json::to_vec(input)
            .map_err(|e| DeployError::Compilation(format!("failed to encode request: {}", e)))?;

        let mut child = Command::new(&solc)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DeployError::Io(format!("failed to run {}: {}", solc.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&request)
                .await
                .map_err(|e| DeployError::Io(format!("failed to write to solc: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DeployError::Io(format!("failed to wait for solc: {}", e)))?;
        if !output.status.success() {
            return Err(DeployError::Compilation(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        let output = CompilerOutput::from_slice(&output.stdout)?;
        output.ensure_success()?;
        tracing::info!("Compilation finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::source::ContractSource;

    #[test]
    fn test_parse_version() {
        let solc = SvmSolc::parse("0.8.17").unwrap();
        assert_eq!(solc.version(), &Version::new(0, 8, 17));
        assert!(SvmSolc::parse("0.8").is_err());
    }

    fn simple_storage() -> ContractSource {
        ContractSource {
            file_name: "SimpleStorage.sol".to_string(),
            content: include_str!("../../contracts/SimpleStorage.sol").to_string(),
        }
    }

    #[tokio::test]
    #[ignore = "downloads solc 0.8.17"]
    async fn test_compile_is_deterministic() {
        let solc = SvmSolc::parse("0.8.17").unwrap();
        let input = CompilerInput::solidity(&simple_storage());

        let first = solc.compile(&input).await.unwrap();
        let second = solc.compile(&input).await.unwrap();

        let a = first.artifact("SimpleStorage.sol", "SimpleStorage").unwrap();
        let b = second.artifact("SimpleStorage.sol", "SimpleStorage").unwrap();
        assert!(!a.bytecode.is_empty());
        assert!(!a.abi.functions.is_empty());
        assert_eq!(a.bytecode, b.bytecode);
    }

    #[tokio::test]
    #[ignore = "downloads solc 0.8.17"]
    async fn test_syntax_error_is_compilation_error() {
        let solc = SvmSolc::parse("0.8.17").unwrap();
        let source = ContractSource {
            file_name: "Broken.sol".to_string(),
            content: "pragma solidity 0.8.17; contract Broken { uint256 x }".to_string(),
        };

        let err = solc
            .compile(&CompilerInput::solidity(&source))
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Compilation(ref text) if text.contains("ParserError")));
    }
}
