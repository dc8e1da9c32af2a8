//! Shared utilities for integration tests: an in-process JSON-RPC node and a
//! compiler that answers from a fixture.

#![allow(dead_code)]

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{keccak256, Address, Bytes, TxKind, B256, U256};
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use contract_deployer::compiler::{Compiler, CompilerInput, CompilerOutput};
use contract_deployer::DeployResult;

/// Anvil's first dev account.
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const CHAIN_ID: u64 = 1337;
pub const GAS_PRICE: u128 = 20_000_000_000;

const STORE_SELECTOR: [u8; 4] = [0x60, 0x57, 0x36, 0x1d];
const RETRIEVE_SELECTOR: [u8; 4] = [0x2e, 0x64, 0xce, 0xc1];

/// When submitted transactions get a receipt.
#[derive(Debug, Clone, Copy)]
pub enum Mining {
    /// Receipt is available on the first poll.
    Instant,
    /// Receipt query returns null this many times first.
    AfterPolls(u32),
    /// Never mined.
    Never,
}

struct NodeState {
    chain_id: u64,
    sender: Address,
    next_nonce: u64,
    block_number: u64,
    mining: Mining,
    revert_creations: bool,
    receipts: HashMap<B256, Value>,
    polls: HashMap<B256, u32>,
    code: HashMap<Address, Bytes>,
    storage: HashMap<Address, U256>,
    methods: Vec<String>,
}

type Shared = Arc<Mutex<NodeState>>;

/// Minimal EVM node emulating the SimpleStorage contract.
///
/// Enforces gapless nonces for a single known sender.
pub struct MockNode {
    pub url: String,
    state: Shared,
}

impl MockNode {
    pub async fn start(sender: Address, start_nonce: u64, mining: Mining) -> Self {
        let state = Arc::new(Mutex::new(NodeState {
            chain_id: CHAIN_ID,
            sender,
            next_nonce: start_nonce,
            block_number: 1,
            mining,
            revert_creations: false,
            receipts: HashMap::new(),
            polls: HashMap::new(),
            code: HashMap::new(),
            storage: HashMap::new(),
            methods: Vec::new(),
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/", post(rpc)).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// JSON-RPC methods received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state.lock().unwrap().methods.clone()
    }

    /// Mine contract creations with a failed status and no code.
    pub fn revert_creations(&self) {
        self.state.lock().unwrap().revert_creations = true;
    }

    pub fn next_nonce(&self) -> u64 {
        self.state.lock().unwrap().next_nonce
    }

    pub fn stored_value(&self, contract: Address) -> Option<U256> {
        self.state.lock().unwrap().storage.get(&contract).copied()
    }
}

async fn rpc(State(state): State<Shared>, Json(request): Json<Value>) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    let mut node = state.lock().unwrap();
    node.methods.push(method.clone());

    let response = match node.dispatch(&method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message }
        }),
    };
    Json(response)
}

fn quantity(value: impl Into<u128>) -> Value {
    json!(format!("0x{:x}", value.into()))
}

impl NodeState {
    fn dispatch(&mut self, method: &str, params: &Value) -> Result<Value, String> {
        match method {
            "eth_chainId" => Ok(quantity(self.chain_id)),
            "eth_blockNumber" => Ok(quantity(self.block_number)),
            "eth_gasPrice" => Ok(quantity(GAS_PRICE)),
            "eth_estimateGas" => Ok(quantity(200_000u64)),
            "eth_getTransactionCount" => Ok(quantity(self.next_nonce)),
            "eth_sendRawTransaction" => self.send_raw(params),
            "eth_getTransactionReceipt" => Ok(self.receipt(params)),
            "eth_getCode" => {
                let address = param_address(params)?;
                let code = self.code.get(&address).cloned().unwrap_or_default();
                Ok(json!(code))
            }
            "eth_call" => self.call(params),
            other => Err(format!("method {} not supported", other)),
        }
    }

    fn send_raw(&mut self, params: &Value) -> Result<Value, String> {
        let raw = params[0].as_str().ok_or("missing raw transaction")?;
        let raw = alloy::hex::decode(raw).map_err(|e| e.to_string())?;
        let tx = TxEnvelope::decode_2718(&mut raw.as_slice()).map_err(|e| e.to_string())?;

        if tx.nonce() < self.next_nonce {
            return Err("nonce too low".to_string());
        }
        if tx.nonce() > self.next_nonce {
            return Err("nonce too high".to_string());
        }
        self.next_nonce += 1;
        self.block_number += 1;

        let hash = keccak256(&raw);
        let mut success = true;
        let (to, created) = match tx.kind() {
            TxKind::Create => {
                let address = self.sender.create(tx.nonce());
                if self.revert_creations {
                    success = false;
                } else {
                    self.code.insert(address, tx.input().clone());
                    self.storage.insert(address, U256::ZERO);
                }
                (None, Some(address))
            }
            TxKind::Call(to) => {
                let input = tx.input();
                if input.len() == 36 && input[..4] == STORE_SELECTOR {
                    self.storage.insert(to, U256::from_be_slice(&input[4..]));
                }
                (Some(to), None)
            }
        };

        let status = if success { "0x1" } else { "0x0" };
        let receipt = json!({
            "transactionHash": hash,
            "transactionIndex": "0x0",
            "blockHash": B256::with_last_byte(self.block_number as u8),
            "blockNumber": quantity(self.block_number),
            "from": self.sender,
            "to": to,
            "contractAddress": created,
            "cumulativeGasUsed": "0x30d40",
            "gasUsed": "0x30d40",
            "effectiveGasPrice": quantity(GAS_PRICE),
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "status": status,
            "type": "0x0"
        });
        self.receipts.insert(hash, receipt);

        Ok(json!(hash))
    }

    fn receipt(&mut self, params: &Value) -> Value {
        let Ok(hash) = serde_json::from_value::<B256>(params[0].clone()) else {
            return Value::Null;
        };
        let polls = self.polls.entry(hash).or_insert(0);
        *polls += 1;

        let mined = match self.mining {
            Mining::Instant => true,
            Mining::AfterPolls(n) => *polls > n,
            Mining::Never => false,
        };
        if mined {
            self.receipts.get(&hash).cloned().unwrap_or(Value::Null)
        } else {
            Value::Null
        }
    }

    fn call(&self, params: &Value) -> Result<Value, String> {
        let tx = &params[0];
        let to: Address = serde_json::from_value(tx["to"].clone()).map_err(|e| e.to_string())?;
        let input = tx
            .get("input")
            .or_else(|| tx.get("data"))
            .and_then(Value::as_str)
            .unwrap_or("0x");
        let input = alloy::hex::decode(input).map_err(|e| e.to_string())?;

        if !self.code.contains_key(&to) {
            return Ok(json!("0x"));
        }
        if input.len() >= 4 && input[..4] == RETRIEVE_SELECTOR {
            let value = self.storage.get(&to).copied().unwrap_or_default();
            return Ok(json!(Bytes::from(value.to_be_bytes::<32>().to_vec())));
        }
        Err("execution reverted".to_string())
    }
}

fn param_address(params: &Value) -> Result<Address, String> {
    serde_json::from_value(params[0].clone()).map_err(|e| e.to_string())
}

/// ABI of the fixture's SimpleStorage contract.
pub fn simple_storage_abi() -> JsonAbi {
    let response = serde_json::from_str(include_str!("../fixtures/simple_storage_output.json")).unwrap();
    CompilerOutput::from_json(response)
        .unwrap()
        .artifact("SimpleStorage.sol", "SimpleStorage")
        .unwrap()
        .abi
}

/// Compiler that answers every request with the same response.
pub struct CannedCompiler {
    response: Value,
    requests: Mutex<Vec<CompilerInput>>,
}

impl CannedCompiler {
    pub fn new(response: Value) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Response shaped like solc's output for `contracts/SimpleStorage.sol`.
    pub fn simple_storage() -> Self {
        Self::new(serde_json::from_str(include_str!("../fixtures/simple_storage_output.json")).unwrap())
    }

    pub fn requests(&self) -> Vec<CompilerInput> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Compiler for CannedCompiler {
    async fn compile(&self, input: &CompilerInput) -> DeployResult<CompilerOutput> {
        self.requests.lock().unwrap().push(input.clone());
        let output = CompilerOutput::from_json(self.response.clone())?;
        output.ensure_success()?;
        Ok(output)
    }
}
