//! Standard JSON compiler request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::compiler::source::ContractSource;

/// Outputs requested for every contract in every file.
pub const DEFAULT_OUTPUT_SELECTION: &[&str] = &["abi", "metadata", "evm.bytecode", "evm.sourceMap"];

/// `{file: {contract: [outputs]}}`
pub type OutputSelection = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Request body for `solc --standard-json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceEntry>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub output_selection: OutputSelection,
}

impl Default for Settings {
    fn default() -> Self {
        let outputs = DEFAULT_OUTPUT_SELECTION
            .iter()
            .map(|s| s.to_string())
            .collect();
        let per_contract = BTreeMap::from([("*".to_string(), outputs)]);
        Self {
            output_selection: BTreeMap::from([("*".to_string(), per_contract)]),
        }
    }
}

impl CompilerInput {
    /// Single-file Solidity request with the default output selection.
    pub fn solidity(source: &ContractSource) -> Self {
        let sources = BTreeMap::from([(
            source.file_name.clone(),
            SourceEntry {
                content: source.content.clone(),
            },
        )]);
        Self {
            language: "Solidity".to_string(),
            sources,
            settings: Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_solidity_request_shape() {
        let source = ContractSource {
            file_name: "SimpleStorage.sol".to_string(),
            content: "contract SimpleStorage {}".to_string(),
        };
        let input = CompilerInput::solidity(&source);

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "language": "Solidity",
                "sources": {
                    "SimpleStorage.sol": { "content": "contract SimpleStorage {}" }
                },
                "settings": {
                    "outputSelection": {
                        "*": { "*": ["abi", "metadata", "evm.bytecode", "evm.sourceMap"] }
                    }
                }
            })
        );
    }
}
