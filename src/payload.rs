//! Per-group request construction.

use crate::{
    config::ReaderConfig,
    encode::CallKind,
    group::BlockGroup,
    types::{CallRequest, IMulticall3, JsonRpcRequest},
};
use alloy::{
    primitives::{Address, Bytes, U64},
    rpc::types::state::{AccountOverride, StateOverride, StateOverridesBuilder},
    sol_types::SolCall,
};
use serde_json::Value;

/// Builds the one `eth_call` request that serves a whole block group.
///
/// Member calldata is encoded first, then folded into a single
/// `tryBlockAndAggregate` with `requireSuccess` unset, so a reverting
/// member surfaces in its own result slot instead of aborting the
/// aggregate. Construction is all-or-nothing: an encoding failure yields
/// no request at all.
pub fn group_request(
    group: &BlockGroup,
    id: u64,
    config: &ReaderConfig,
) -> Result<JsonRpcRequest, serde_json::Error> {
    let calls: Vec<IMulticall3::Call> = group
        .calls
        .iter()
        .map(|call| IMulticall3::Call {
            target: call.kind.target(config.multicall_address),
            callData: call.kind.calldata(),
        })
        .collect();

    let data = IMulticall3::tryBlockAndAggregateCall { requireSuccess: false, calls }.abi_encode();
    let call = CallRequest {
        to: config.multicall_address,
        data: data.into(),
        gas: Some(U64::from(config.aggregate_gas)),
    };

    let mut params = vec![serde_json::to_value(&call)?, Value::String(block_tag(group.block))];
    if let Some(code) = &config.override_code {
        params.push(serde_json::to_value(code_override(
            config.multicall_address,
            code.clone(),
        ))?);
    }

    Ok(JsonRpcRequest::new(id, "eth_call", Value::Array(params)))
}

/// Builds the plain request for one query in direct mode.
///
/// Token reads are a bare `eth_call` of `balanceOf`, native reads use
/// `eth_getBalance`. No gas ceiling and no override are attached.
pub fn direct_request(
    kind: &CallKind,
    block: u64,
    id: u64,
) -> Result<JsonRpcRequest, serde_json::Error> {
    let request = match kind {
        CallKind::TokenBalance { token, .. } => {
            let call = CallRequest { to: *token, data: kind.calldata(), gas: None };
            JsonRpcRequest::new(
                id,
                "eth_call",
                Value::Array(vec![serde_json::to_value(&call)?, Value::String(block_tag(block))]),
            )
        }
        CallKind::NativeBalance { wallet } => JsonRpcRequest::new(
            id,
            "eth_getBalance",
            Value::Array(vec![serde_json::to_value(wallet)?, Value::String(block_tag(block))]),
        ),
    };
    Ok(request)
}

/// Minimal hex form of a block number, per the JSON-RPC quantity rules.
pub fn block_tag(block: u64) -> String {
    format!("0x{block:x}")
}

/// State override map planting `code` at the multicall address for the
/// duration of one call.
fn code_override(address: Address, code: Bytes) -> StateOverride {
    StateOverridesBuilder::with_capacity(1)
        .append(address, AccountOverride::default().with_code(code))
        .build()
}
