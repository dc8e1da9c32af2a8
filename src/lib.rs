//! Compile a Solidity contract, deploy it to an EVM node and exercise it.

pub mod blockchain;
pub mod compiler;
pub mod config;
pub mod contract;
pub mod deployer;
pub mod observability;

pub use blockchain::types::{DeployError, DeployResult};
pub use config::schema::DeployerConfig;
pub use deployer::{Deployer, DeploymentReport};
