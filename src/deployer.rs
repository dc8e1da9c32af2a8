//! The deployment pipeline.
//!
//! # Data Flow
//! ```text
//! PRIVATE_KEY ─▶ Wallet                     (before any network call)
//! source ─▶ compile ─▶ artifact file
//! node ─▶ ChainClient ─▶ NonceSequence(N)
//!     deploy      (nonce N)   ─▶ query
//!     call_function (nonce N+1) ─▶ query
//! ```
//!
//! Strictly sequential. Any failure aborts the run; nothing is retried.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash};
use std::path::Path;

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::{NonceSequence, TxBuilder, TxPayload};
use crate::blockchain::types::{DeployError, DeployResult};
use crate::blockchain::wallet::Wallet;
use crate::compiler::{load_source, write_artifact, CompiledArtifact, Compiler, CompilerInput};
use crate::config::DeployerConfig;
use crate::contract::{creation_code, format_values, DeployedContract};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub contract_address: Address,
    pub deploy_tx: TxHash,
    pub deploy_nonce: u64,
    pub call_tx: TxHash,
    pub call_nonce: u64,
    /// Query result right after deployment.
    pub initial_value: Vec<DynSolValue>,
    /// Query result after the state-mutating call.
    pub final_value: Vec<DynSolValue>,
}

/// Drives one compile → deploy → interact run.
pub struct Deployer<C> {
    config: DeployerConfig,
    compiler: C,
}

impl<C: Compiler> Deployer<C> {
    pub fn new(config: DeployerConfig, compiler: C) -> Self {
        Self { config, compiler }
    }

    /// Run the whole pipeline.
    ///
    /// The signing key is loaded first, so a missing key aborts before the
    /// compiler or the node is contacted.
    pub async fn run(&self) -> DeployResult<DeploymentReport> {
        let wallet = self.load_wallet()?;
        let artifact = self.compile().await?;
        let client = ChainClient::connect(self.config.blockchain.clone()).await?;
        self.deploy_and_interact(client, wallet, artifact).await
    }

    fn load_wallet(&self) -> DeployResult<Wallet> {
        let wallet = Wallet::from_env(&self.config.wallet.private_key_env)?;
        if let Some(sender) = &self.config.wallet.sender {
            let sender: Address = sender
                .parse()
                .map_err(|e| DeployError::Config(format!("invalid sender {}: {}", sender, e)))?;
            wallet.ensure_sender(sender)?;
        }
        Ok(wallet)
    }

    /// Read the source, compile it, persist the response and extract the contract.
    pub async fn compile(&self) -> DeployResult<CompiledArtifact> {
        let settings = &self.config.compiler;
        let source = load_source(Path::new(&settings.source_path))?;

        let output = self.compiler.compile(&CompilerInput::solidity(&source)).await?;
        write_artifact(Path::new(&settings.artifact_path), &output)?;

        let artifact = output.artifact(&source.file_name, &settings.contract_name)?;
        tracing::info!(
            contract = %settings.contract_name,
            bytecode_len = artifact.bytecode.len(),
            functions = artifact.abi.functions.len(),
            "Contract compiled"
        );
        Ok(artifact)
    }

    /// Deploy `artifact`, then query, call and query again.
    pub async fn deploy_and_interact(
        &self,
        client: ChainClient,
        wallet: Wallet,
        artifact: CompiledArtifact,
    ) -> DeployResult<DeploymentReport> {
        let interaction = &self.config.interaction;
        let sender = wallet.address();

        let mut nonces = NonceSequence::starting_at(client.get_transaction_count(sender).await?);
        tracing::info!(sender = %sender, nonce = nonces.peek(), "Account nonce loaded");

        let builder = TxBuilder::new(client.clone(), wallet);

        let code = creation_code(&artifact.abi, &artifact.bytecode, &interaction.constructor_args)?;
        let deployed = builder
            .execute(TxPayload::Create { code }, nonces.take())
            .await?;
        let contract_address = deployed.contract_address().ok_or_else(|| {
            DeployError::Rpc(format!("creation receipt {} has no contract address", deployed.hash()))
        })?;
        tracing::info!(address = %contract_address, "Contract deployed");

        let contract = DeployedContract::new(contract_address, artifact.abi);
        let initial_value = contract
            .query(&client, &interaction.query_function, &[])
            .await?;
        tracing::info!(
            function = %interaction.query_function,
            value = %format_values(&initial_value),
            "Queried deployed contract"
        );

        let payload = contract.call_payload(&interaction.call_function, &interaction.call_args)?;
        let called = builder.execute(payload, nonces.take()).await?;

        let final_value = contract
            .query(&client, &interaction.query_function, &[])
            .await?;
        tracing::info!(
            function = %interaction.query_function,
            value = %format_values(&final_value),
            "Queried after update"
        );

        Ok(DeploymentReport {
            contract_address,
            deploy_tx: deployed.hash(),
            deploy_nonce: deployed.nonce(),
            call_tx: called.hash(),
            call_nonce: called.nonce(),
            initial_value,
            final_value,
        })
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }
}
