//! Standard JSON compiler response and the deployable artifact extracted from it.

use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::blockchain::types::{DeployError, DeployResult};

/// One entry of the response's `errors` array (warnings included).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: String,
    pub message: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }

    /// The toolchain's own rendering, falling back to the bare message.
    pub fn text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}

/// Full compiler response, kept verbatim for the artifact file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOutput {
    raw: Value,
}

/// Everything needed to deploy and talk to one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    pub bytecode: Bytes,
    pub abi: JsonAbi,
    pub metadata: Option<String>,
    pub source_map: Option<String>,
}

impl CompilerOutput {
    pub fn from_json(raw: Value) -> DeployResult<Self> {
        if !raw.is_object() {
            return Err(DeployError::Compilation(
                "compiler response is not a JSON object".to_string(),
            ));
        }
        Ok(Self { raw })
    }

    pub fn from_slice(bytes: &[u8]) -> DeployResult<Self> {
        let raw = serde_json::from_slice(bytes).map_err(|e| {
            DeployError::Compilation(format!("unreadable compiler response: {}", e))
        })?;
        Self::from_json(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// All diagnostics reported by the compiler.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.raw
            .get("errors")
            .and_then(|errors| serde_json::from_value(errors.clone()).ok())
            .unwrap_or_default()
    }

    /// Fail with the toolchain's error text if any diagnostic is an error.
    pub fn ensure_success(&self) -> DeployResult<()> {
        let diagnostics = self.diagnostics();
        for warning in diagnostics.iter().filter(|d| !d.is_error()) {
            tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        }

        let errors: Vec<&str> = diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(Diagnostic::text)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DeployError::Compilation(errors.join("\n")))
        }
    }

    /// Extract `[file][contract]` from the `contracts` section.
    pub fn artifact(&self, file: &str, contract: &str) -> DeployResult<CompiledArtifact> {
        let entry = self
            .raw
            .get("contracts")
            .and_then(|contracts| contracts.get(file))
            .and_then(|contracts| contracts.get(contract))
            .ok_or_else(|| {
                DeployError::Compilation(format!("contract {} not found in {}", contract, file))
            })?;

        let abi: JsonAbi = match entry.get("abi") {
            Some(abi) => serde_json::from_value(abi.clone()).map_err(|e| {
                DeployError::Compilation(format!("invalid ABI for {}: {}", contract, e))
            })?,
            None => JsonAbi::new(),
        };

        let bytecode_hex = entry
            .pointer("/evm/bytecode/object")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if bytecode_hex.is_empty() {
            return Err(DeployError::Compilation(format!(
                "{} has no bytecode (abstract contract or interface?)",
                contract
            )));
        }
        let bytecode: Bytes = alloy::hex::decode(bytecode_hex)
            .map_err(|e| {
                DeployError::Compilation(format!(
                    "bytecode for {} is not deployable (unlinked libraries?): {}",
                    contract, e
                ))
            })?
            .into();

        let metadata = entry
            .get("metadata")
            .and_then(Value::as_str)
            .map(str::to_string);
        let source_map = entry
            .pointer("/evm/bytecode/sourceMap")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(CompiledArtifact {
            bytecode,
            abi,
            metadata,
            source_map,
        })
    }
}
