//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll interval > 0)
//! - Check that versions, URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::DeployerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &DeployerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let compiler = &config.compiler;
    if compiler.source_path.trim().is_empty() {
        errors.push(ValidationError::new("compiler.source_path", "must not be empty"));
    }
    if compiler.contract_name.trim().is_empty() {
        errors.push(ValidationError::new("compiler.contract_name", "must not be empty"));
    }
    if compiler.artifact_path.trim().is_empty() {
        errors.push(ValidationError::new("compiler.artifact_path", "must not be empty"));
    }
    if let Err(e) = semver::Version::parse(&compiler.solc_version) {
        errors.push(ValidationError::new(
            "compiler.solc_version",
            format!("'{}' is not a version: {}", compiler.solc_version, e),
        ));
    }

    let chain = &config.blockchain;
    if let Err(e) = url::Url::parse(&chain.rpc_url) {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("'{}' is not a URL: {}", chain.rpc_url, e),
        ));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            "must be > 0",
        ));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("blockchain.poll_interval_ms", "must be > 0"));
    }

    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("wallet.private_key_env", "must not be empty"));
    }
    if let Some(sender) = &config.wallet.sender {
        if sender.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "wallet.sender",
                format!("'{}' is not an address", sender),
            ));
        }
    }

    if config.interaction.call_function.trim().is_empty() {
        errors.push(ValidationError::new("interaction.call_function", "must not be empty"));
    }
    if config.interaction.query_function.trim().is_empty() {
        errors.push(ValidationError::new("interaction.query_function", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DeployerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DeployerConfig::default();
        config.compiler.solc_version = "latest".to_string();
        config.blockchain.rpc_url = "not a url".to_string();
        config.blockchain.poll_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "compiler.solc_version",
                "blockchain.rpc_url",
                "blockchain.poll_interval_ms"
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_sender() {
        let mut config = DeployerConfig::default();
        config.wallet.sender = Some("0x1234".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string().split(':').next(), Some("wallet.sender"));
    }
}
