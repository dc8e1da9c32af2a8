//! Transaction building, signing, submission and confirmation.
//!
//! Each transaction moves through four typed stages:
//!
//! ```text
//! BuiltTx ──sign──▶ SignedTx ──submit──▶ SubmittedTx ──confirm──▶ ConfirmedTx
//! ```
//!
//! A stage can only be produced from the previous one, so a transaction
//! cannot be broadcast unsigned or confirmed before it was sent.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{DeployError, DeployResult};
use crate::blockchain::wallet::Wallet;

/// What a transaction does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxPayload {
    /// Contract creation: init code followed by encoded constructor args.
    Create { code: Bytes },
    /// Call into an existing contract.
    Call { to: Address, data: Bytes },
}

/// Locally tracked nonce for a single sender.
///
/// Seeded once from the chain, then advanced after every submission
/// without re-querying the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceSequence {
    next: u64,
}

impl NonceSequence {
    /// Start from the account's on-chain transaction count.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Return the nonce for the next transaction and advance.
    pub fn take(&mut self) -> u64 {
        let nonce = self.next;
        self.next += 1;
        nonce
    }

    /// Nonce the next `take` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// An unsigned, fully populated transaction.
#[derive(Debug, Clone)]
pub struct BuiltTx {
    request: TransactionRequest,
    nonce: u64,
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTx {
    encoded: Bytes,
    hash: TxHash,
    nonce: u64,
}

/// A transaction the node has accepted.
#[derive(Debug, Clone, Copy)]
pub struct SubmittedTx {
    hash: TxHash,
    nonce: u64,
}

/// A mined transaction with its receipt.
#[derive(Debug, Clone)]
pub struct ConfirmedTx {
    receipt: TransactionReceipt,
    nonce: u64,
}

impl BuiltTx {
    pub(crate) fn from_request(request: TransactionRequest, nonce: u64) -> Self {
        Self { request, nonce }
    }

    /// Sign with the sender's key.
    ///
    /// Fails with `Signing` if the request is incomplete or the wallet holds
    /// no key for the request's `from` address.
    pub async fn sign(self, wallet: &Wallet) -> DeployResult<SignedTx> {
        let envelope = TransactionBuilder::<Ethereum>::build(self.request, &wallet.network_wallet())
            .await
            .map_err(|e| DeployError::Signing(e.to_string()))?;

        Ok(SignedTx {
            hash: *envelope.tx_hash(),
            encoded: envelope.encoded_2718().into(),
            nonce: self.nonce,
        })
    }
}

impl SignedTx {
    /// Broadcast to the node. Returns once the node has accepted it.
    pub async fn submit(self, client: &ChainClient) -> DeployResult<SubmittedTx> {
        let hash = client.send_raw_transaction(&self.encoded).await?;
        if hash != self.hash {
            tracing::warn!(local = %self.hash, node = %hash, "Node reported a different tx hash");
        }
        Ok(SubmittedTx {
            hash,
            nonce: self.nonce,
        })
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// EIP-2718 encoded bytes.
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }
}

impl SubmittedTx {
    /// Block until the transaction is mined.
    ///
    /// A timeout is fatal; a receipt with failed status becomes `Reverted`.
    pub async fn confirm(self, client: &ChainClient) -> DeployResult<ConfirmedTx> {
        let receipt = client.wait_for_receipt(self.hash).await?;
        if !receipt.status() {
            return Err(DeployError::Reverted(format!(
                "{} (nonce {})",
                self.hash, self.nonce
            )));
        }
        Ok(ConfirmedTx {
            receipt,
            nonce: self.nonce,
        })
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }
}

impl ConfirmedTx {
    pub fn hash(&self) -> TxHash {
        self.receipt.transaction_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn block_number(&self) -> Option<u64> {
        self.receipt.block_number
    }

    /// Address of the created contract, for creation transactions only.
    pub fn contract_address(&self) -> Option<Address> {
        self.receipt.contract_address
    }
}

/// Builds and drives transactions for one sender.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: ChainClient,
    wallet: Wallet,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(client: ChainClient, wallet: Wallet) -> Self {
        Self { client, wallet }
    }

    /// Assemble a legacy (EIP-155) transaction for `payload` at `nonce`.
    ///
    /// Gas price is read from the node and the gas limit estimated.
    pub async fn build(&self, payload: TxPayload, nonce: u64) -> DeployResult<BuiltTx> {
        let gas_price = self.client.get_gas_price().await?;

        let tx = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.client.chain_id());

        let tx = match payload {
            TxPayload::Create { code } => tx.with_deploy_code(code),
            TxPayload::Call { to, data } => tx.with_to(to).with_input(data),
        };

        let gas_limit = self.client.estimate_gas(tx.clone()).await?;

        Ok(BuiltTx::from_request(tx.with_gas_limit(gas_limit), nonce))
    }

    /// Run a transaction through every stage and return its receipt.
    pub async fn execute(&self, payload: TxPayload, nonce: u64) -> DeployResult<ConfirmedTx> {
        let built = self.build(payload, nonce).await?;
        tracing::debug!(nonce, gas = ?built.request.gas, "Transaction built");

        let signed = built.sign(&self.wallet).await?;
        tracing::debug!(nonce, tx_hash = %signed.hash(), "Transaction signed");

        let submitted = signed.submit(&self.client).await?;
        tracing::info!(nonce, tx_hash = %submitted.hash(), "Transaction submitted");

        let confirmed = submitted.confirm(&self.client).await?;
        tracing::info!(
            nonce,
            tx_hash = %confirmed.hash(),
            block_number = ?confirmed.block_number(),
            "Transaction confirmed"
        );

        Ok(confirmed)
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }
}
