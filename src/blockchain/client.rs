//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint and verify the chain
//! - Query chain state (nonce, gas price, code, receipts)
//! - Submit signed transactions and poll for their receipts
//! - Bound every request with a timeout

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::types::{BlockchainConfig, ChainId, DeployError, DeployResult};

/// Connection handle to a single JSON-RPC node.
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Connect over HTTP and verify the node serves the configured chain.
    ///
    /// # Returns
    /// A ready client, or `Connection` if the node cannot be reached and
    /// `ChainMismatch` if it reports a different chain id.
    pub async fn connect(config: BlockchainConfig) -> DeployResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            DeployError::Connection(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new().connect_http(url);
        let client = Self::with_provider(Arc::new(provider), config);

        client.verify_chain_id().await?;
        tracing::info!(
            rpc_url = %client.config.rpc_url,
            chain_id = client.config.chain_id,
            "Connected to node"
        );

        Ok(client)
    }

    /// Wrap an existing provider without any network round-trip.
    pub fn with_provider(provider: Arc<dyn Provider + Send + Sync>, config: BlockchainConfig) -> Self {
        Self {
            provider,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        }
    }

    async fn request<T, F>(&self, method: &'static str, fut: F) -> DeployResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(method, error = %e, "RPC error");
                Err(DeployError::from_transport(e))
            }
            Err(_) => {
                tracing::warn!(method, "RPC timeout");
                Err(DeployError::Timeout {
                    what: method.to_string(),
                    secs: self.config.rpc_timeout_secs,
                })
            }
        }
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> DeployResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(DeployError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> DeployResult<ChainId> {
        self.request("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> DeployResult<u64> {
        self.request(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address),
        )
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> DeployResult<u128> {
        self.request("eth_gasPrice", self.provider.get_gas_price()).await
    }

    /// Estimate the gas limit for a transaction.
    pub async fn estimate_gas(&self, tx: TransactionRequest) -> DeployResult<u64> {
        self.request("eth_estimateGas", self.provider.estimate_gas(tx)).await
    }

    /// Broadcast an EIP-2718 encoded, signed transaction.
    ///
    /// Returns as soon as the node accepts it into its pool.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> DeployResult<TxHash> {
        let pending = self
            .request(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(encoded),
            )
            .await?;
        Ok(*pending.tx_hash())
    }

    /// Get a transaction receipt by hash; `None` while the transaction is pending.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> DeployResult<Option<TransactionReceipt>> {
        self.request(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
    }

    /// Get the runtime code deployed at an address.
    pub async fn get_code(&self, address: Address) -> DeployResult<Bytes> {
        self.request("eth_getCode", self.provider.get_code_at(address))
            .await
    }

    /// Execute a read-only call against the latest block.
    pub async fn call(&self, tx: TransactionRequest) -> DeployResult<Bytes> {
        self.request("eth_call", self.provider.call(tx)).await
    }

    /// Poll until the transaction is mined.
    ///
    /// Fails with `Timeout` once `confirmation_timeout_secs` elapses. The wait
    /// is a plain future, so dropping it cancels the polling.
    pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> DeployResult<TransactionReceipt> {
        let timeout_secs = self.config.confirmation_timeout_secs;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                match self.get_transaction_receipt(tx_hash).await? {
                    Some(receipt) => return Ok(receipt),
                    None => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
                }
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(DeployError::Timeout {
                what: format!("receipt for {}", tx_hash),
                secs: timeout_secs,
            }),
        }
    }

    /// Chain id transactions are signed for.
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlockchainConfig {
        BlockchainConfig {
            // Nothing listens on port 1
            rpc_url: "http://127.0.0.1:1".to_string(),
            chain_id: 1337,
            rpc_timeout_secs: 5,
            confirmation_timeout_secs: 1,
            poll_interval_ms: 50,
        }
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let result = ChainClient::connect(test_config()).await;
        assert!(matches!(result, Err(DeployError::Connection(_))));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let mut config = test_config();
        config.rpc_url = "::not-a-url::".to_string();
        let err = ChainClient::connect(config).await.unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[test]
    fn test_debug_hides_provider() {
        let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap());
        let client = ChainClient::with_provider(Arc::new(provider), test_config());
        let debug = format!("{:?}", client);
        assert!(debug.contains("127.0.0.1:1"));
        assert_eq!(client.chain_id(), 1337);
    }
}
