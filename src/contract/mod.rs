//! Deployed contract handle: ABI encoding and read-only queries.
//!
//! String arguments (as they appear in config) are coerced to the ABI
//! parameter types, so `store(["15"])` becomes a `uint256` argument.

use alloy::dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy::json_abi::{Function, JsonAbi, Param};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::TxPayload;
use crate::blockchain::types::{DeployError, DeployResult};

/// A contract at a known address with its interface.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    address: Address,
    abi: JsonAbi,
}

impl DeployedContract {
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Resolve `name` to the overload taking `arity` arguments.
    pub fn function(&self, name: &str, arity: usize) -> DeployResult<&Function> {
        let overloads = self
            .abi
            .function(name)
            .ok_or_else(|| DeployError::ContractCall(format!("function {} not in ABI", name)))?;

        overloads
            .iter()
            .find(|f| f.inputs.len() == arity)
            .ok_or_else(|| {
                DeployError::ContractCall(format!(
                    "no overload of {} takes {} argument(s)",
                    name, arity
                ))
            })
    }

    /// ABI-encoded call data (selector followed by arguments).
    pub fn encode_call(&self, name: &str, args: &[String]) -> DeployResult<Bytes> {
        let function = self.function(name, args.len())?;
        let values = coerce_args(&function.inputs, args)?;
        let data = function
            .abi_encode_input(&values)
            .map_err(|e| DeployError::ContractCall(format!("cannot encode {}: {}", name, e)))?;
        Ok(data.into())
    }

    /// Payload for a state-mutating transaction calling `name`.
    pub fn call_payload(&self, name: &str, args: &[String]) -> DeployResult<TxPayload> {
        Ok(TxPayload::Call {
            to: self.address,
            data: self.encode_call(name, args)?,
        })
    }

    /// Read-only call; nothing is submitted and no gas is spent.
    ///
    /// Fails with `ContractCall` when the function is not in the ABI, the
    /// address has no code, or the call reverts.
    pub async fn query(
        &self,
        client: &ChainClient,
        name: &str,
        args: &[String],
    ) -> DeployResult<Vec<DynSolValue>> {
        let function = self.function(name, args.len())?;
        let data = self.encode_call(name, args)?;

        let code = client.get_code(self.address).await?;
        if code.is_empty() {
            return Err(DeployError::ContractCall(format!(
                "no contract code at {}",
                self.address
            )));
        }

        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(data);
        let output = client.call(tx).await.map_err(|e| match e {
            DeployError::Rpc(message) => {
                DeployError::ContractCall(format!("{} reverted: {}", name, message))
            }
            other => other,
        })?;

        function
            .abi_decode_output(&output)
            .map_err(|e| DeployError::ContractCall(format!("cannot decode {} output: {}", name, e)))
    }
}

/// Creation code: bytecode followed by the encoded constructor arguments.
pub fn creation_code(abi: &JsonAbi, bytecode: &Bytes, args: &[String]) -> DeployResult<Bytes> {
    let Some(constructor) = &abi.constructor else {
        if !args.is_empty() {
            return Err(DeployError::ContractCall(
                "constructor arguments given but the contract has no constructor".to_string(),
            ));
        }
        return Ok(bytecode.clone());
    };

    if constructor.inputs.len() != args.len() {
        return Err(DeployError::ContractCall(format!(
            "constructor takes {} argument(s), got {}",
            constructor.inputs.len(),
            args.len()
        )));
    }

    let values = coerce_args(&constructor.inputs, args)?;
    let encoded = constructor
        .abi_encode_input(&values)
        .map_err(|e| DeployError::ContractCall(format!("cannot encode constructor: {}", e)))?;

    let mut code = bytecode.to_vec();
    code.extend_from_slice(&encoded);
    Ok(code.into())
}

fn coerce_args(params: &[Param], args: &[String]) -> DeployResult<Vec<DynSolValue>> {
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param.resolve().map_err(|e| {
                DeployError::ContractCall(format!("unsupported type {}: {}", param.ty, e))
            })?;
            ty.coerce_str(arg).map_err(|e| {
                DeployError::ContractCall(format!(
                    "'{}' is not a valid {} for {}: {}",
                    arg, param.ty, param.name, e
                ))
            })
        })
        .collect()
}

/// Render decoded values for output: integers in decimal, everything else as-is.
pub fn format_values(values: &[DynSolValue]) -> String {
    values
        .iter()
        .map(|value| match value {
            DynSolValue::Uint(v, _) => v.to_string(),
            DynSolValue::Int(v, _) => v.to_string(),
            DynSolValue::Bool(b) => b.to_string(),
            DynSolValue::Address(a) => a.to_string(),
            DynSolValue::String(s) => s.clone(),
            other => format!("{:?}", other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
