#![allow(dead_code)]

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{hex, Address, B256};
use serde::Deserialize;
use serde_json::{json, Value};
use wiremock::{http::Method, Match, MockServer, Request, Respond, ResponseTemplate};

pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

#[derive(Debug, Deserialize)]
struct RpcRequest {
    id: u64,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Matches `eth_getLogs` requests, optionally for a single topic 0.
pub struct GetLogsMatcher {
    topic0: Option<B256>,
}

pub struct RpcResponse {
    result: Value,
}

pub struct RpcErrorResponse {
    message: String,
}

pub fn get_logs_request() -> GetLogsMatcher {
    GetLogsMatcher { topic0: None }
}

pub fn get_logs_request_for(topic0: B256) -> GetLogsMatcher {
    GetLogsMatcher {
        topic0: Some(topic0),
    }
}

impl RpcResponse {
    pub fn new(result: Value) -> Self {
        Self { result }
    }
}

impl RpcErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Match for GetLogsMatcher {
    fn matches(&self, req: &Request) -> bool {
        if req.method != Method::POST {
            return false;
        }

        let Ok(rpc_req) = serde_json::from_slice::<RpcRequest>(&req.body) else {
            return false;
        };

        if rpc_req.method != "eth_getLogs" {
            return false;
        }

        let Some(expected) = self.topic0 else {
            return true;
        };

        let expected = Value::String(hex::encode_prefixed(expected));
        match &rpc_req.params[0]["topics"][0] {
            Value::Array(values) => values.contains(&expected),
            value => *value == expected,
        }
    }
}

impl Respond for RpcResponse {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        if let Ok(rpc_req) = serde_json::from_slice::<RpcRequest>(&req.body) {
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": rpc_req.id,
                "result": self.result,
            }))
        } else {
            ResponseTemplate::new(400)
        }
    }
}

impl Respond for RpcErrorResponse {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        if let Ok(rpc_req) = serde_json::from_slice::<RpcRequest>(&req.body) {
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": rpc_req.id,
                "error": {
                    "code": -32000,
                    "message": self.message,
                }
            }))
        } else {
            ResponseTemplate::new(400)
        }
    }
}

/// JSON-RPC representation of a `MappingUpdated(string)` log.
pub fn mapping_updated_log(topic0: B256, value: &str, block_number: u64, log_index: u64) -> Value {
    let data = DynSolValue::Tuple(vec![DynSolValue::String(value.to_string())]).abi_encode_params();
    new_log(vec![topic0], data, block_number, log_index)
}

pub fn new_log(topics: Vec<B256>, data: Vec<u8>, block_number: u64, log_index: u64) -> Value {
    let address = CONTRACT.parse::<Address>().expect("valid contract address");
    json!({
        "address": address,
        "topics": topics,
        "data": hex::encode_prefixed(data),
        "blockHash": B256::repeat_byte(block_number as u8),
        "blockNumber": format!("0x{block_number:x}"),
        "transactionHash": B256::repeat_byte(0x11),
        "transactionIndex": "0x0",
        "logIndex": format!("0x{log_index:x}"),
        "removed": false,
    })
}

/// Number of requests received by the server whose path starts with `prefix`.
pub async fn requests_with_path_prefix(server: &MockServer, prefix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path().starts_with(prefix))
        .count()
}
