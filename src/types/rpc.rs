//! JSON-RPC 2.0 envelope types.
//!
//! The engine talks to nodes over raw batched JSON-RPC instead of a
//! provider stack, so ids, params and state overrides stay explicit and
//! inspectable. Responses are paired back to requests by id, never by
//! position in the batch.

use alloy::primitives::{Address, Bytes, U64};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error as _, Unexpected},
};
use serde_json::Value;

/// The `jsonrpc` protocol tag. Serializes as `"2.0"` and rejects anything
/// else on the way in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct V2;

impl Serialize for V2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("2.0")
    }
}

impl<'de> Deserialize<'de> for V2 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        if version == "2.0" {
            Ok(V2)
        } else {
            Err(D::Error::invalid_value(Unexpected::Str(&version), &"\"2.0\""))
        }
    }
}

/// A response id as echoed by the node.
///
/// The engine only ever assigns numeric ids, but nodes answer unparseable
/// batch entries with `null` and some proxies stringify ids, so the
/// permissive shape is kept for deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseId {
    /// Numeric id, the shape the engine sends.
    Number(u64),
    /// String id.
    String(String),
    /// Null id on entries the node could not attribute.
    Null,
}

/// Error object carried by a failed JSON-RPC response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code.
    pub code: i64,
    /// Human readable message.
    pub message: String,
    /// Optional structured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The mutually exclusive outcome half of a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePayload {
    /// The call result. `eth_call` and `eth_getBalance` both answer with a
    /// `0x`-prefixed hex string.
    #[serde(rename = "result")]
    Result(String),
    /// The node-side failure.
    #[serde(rename = "error")]
    Error(ErrorObject),
}

/// One request inside a batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol tag.
    pub jsonrpc: V2,
    /// Method name.
    pub method: String,
    /// Positional params.
    pub params: Value,
    /// Batch-unique id the response is paired by.
    pub id: u64,
}

impl JsonRpcRequest {
    /// Builds a request with positional params.
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self { jsonrpc: V2, method: method.into(), params, id }
    }
}

/// One response inside a batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol tag.
    pub jsonrpc: V2,
    /// Result or error, exactly one present.
    #[serde(flatten)]
    pub payload: ResponsePayload,
    /// Echo of the request id.
    pub id: ResponseId,
}

impl JsonRpcResponse {
    /// A successful response carrying a hex-encoded result.
    pub fn result(id: u64, result: impl Into<String>) -> Self {
        Self {
            jsonrpc: V2,
            payload: ResponsePayload::Result(result.into()),
            id: ResponseId::Number(id),
        }
    }

    /// A failed response carrying a node error.
    pub fn error(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: V2,
            payload: ResponsePayload::Error(ErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
            id: ResponseId::Number(id),
        }
    }
}

/// The transaction object of an `eth_call`, trimmed to the fields the
/// engine sends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallRequest {
    /// Callee contract.
    pub to: Address,
    /// ABI calldata.
    pub data: Bytes,
    /// Optional gas ceiling, as a hex quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
}
