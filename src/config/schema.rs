//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deployment run.
//! All types derive Serde traits for deserialization from config files, and
//! the defaults reproduce a local development run against a node on port 8545.

use serde::{Deserialize, Serialize};

use crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR;

/// Root configuration for the deployer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployerConfig {
    /// Source location and compiler pinning.
    pub compiler: CompilerConfig,

    /// Node endpoint and confirmation settings.
    pub blockchain: BlockchainConfig,

    /// Where the signing key comes from.
    pub wallet: WalletConfig,

    /// Functions exercised after deployment.
    pub interaction: InteractionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Compiler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Path to the Solidity source file.
    pub source_path: String,

    /// Contract to deploy from the compiled file.
    pub contract_name: String,

    /// Exact solc version, installed on demand.
    pub solc_version: String,

    /// Where the full compiler response is written.
    pub artifact_path: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            source_path: "contracts/SimpleStorage.sol".to_string(),
            contract_name: "SimpleStorage".to_string(),
            solc_version: "0.8.17".to_string(),
            artifact_path: "compiled_sol.json".to_string(),
        }
    }
}

/// Blockchain node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (1337 for Ganache, 31337 for Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum time to wait for a transaction to be mined.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 1337,
            rpc_timeout_secs: 10,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 500,
        }
    }
}

/// Signing account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    pub private_key_env: String,

    /// Expected sender address. When set, the key must derive to it.
    pub sender: Option<String>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: PRIVATE_KEY_ENV_VAR.to_string(),
            sender: None,
        }
    }
}

/// Post-deployment interaction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Arguments for the constructor, coerced to the ABI types.
    pub constructor_args: Vec<String>,

    /// State-mutating function sent as a transaction.
    pub call_function: String,

    /// Arguments for `call_function`.
    pub call_args: Vec<String>,

    /// Read-only function queried before and after the call.
    pub query_function: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            constructor_args: Vec::new(),
            call_function: "store".to_string(),
            call_args: vec!["15".to_string()],
            query_function: "retrieve".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "contract_deployer=info".to_string(),
        }
    }
}
