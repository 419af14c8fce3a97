//! Response demultiplexing.
//!
//! The inverse of planning: batched responses are paired to their block
//! groups by id, each aggregate return is unpacked member by member, and
//! the outcomes are scattered back onto the original input order.

use crate::{
    config::ReaderConfig,
    encode::CallKind,
    error::{CallError, ReaderError},
    group::{BlockGroup, BlockGroups},
    types::{IMulticall3, JsonRpcResponse, ResponseId, ResponsePayload},
};
use alloy::{
    primitives::{Bytes, U256},
    sol_types::SolCall,
};
use std::collections::HashMap;
use tracing::warn;

/// One output slot: the balance, or the typed failure that took its place.
pub type BalanceOutcome = Result<U256, CallError>;

/// Scatters aggregate-mode responses back onto input order.
///
/// `output[i]` answers query `i`; group-level failures respect the
/// configured isolation policy.
pub fn demux(
    groups: &BlockGroups,
    responses: Vec<JsonRpcResponse>,
    config: &ReaderConfig,
) -> Result<Vec<BalanceOutcome>, ReaderError> {
    let mut by_id = index_by_id(responses);
    let mut indexed: Vec<(usize, BalanceOutcome)> = Vec::new();

    for (position, group) in groups.iter().enumerate() {
        let id = position as u64 + 1;
        match group_outcomes(group, by_id.remove(&id), id) {
            Ok(outcomes) => {
                indexed.extend(group.calls.iter().map(|call| call.index).zip(outcomes));
            }
            Err(error) => {
                if !config.isolate_groups {
                    return Err(ReaderError::Group { block: group.block, source: error });
                }
                warn!(block = group.block, %error, "block group failed");
                indexed
                    .extend(group.calls.iter().map(|call| (call.index, Err(error.clone()))));
            }
        }
    }

    // Planning puts every input index in exactly one group, so the stable
    // sort on original index restores input order without gaps.
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, outcome)| outcome).collect())
}

/// Pairs direct-mode responses to their queries, one per id.
///
/// There are no groups to fail here, so every inconsistency is local to
/// its own slot.
pub fn demux_direct(kinds: &[CallKind], responses: Vec<JsonRpcResponse>) -> Vec<BalanceOutcome> {
    let mut by_id = index_by_id(responses);

    kinds
        .iter()
        .enumerate()
        .map(|(position, kind)| {
            let id = position as u64 + 1;
            direct_outcome(kind, by_id.remove(&id), id)
        })
        .collect()
}

/// Indexes responses by their numeric id. First occurrence wins; entries
/// the node could not attribute (null or string ids) match nothing and are
/// dropped.
fn index_by_id(responses: Vec<JsonRpcResponse>) -> HashMap<u64, JsonRpcResponse> {
    let mut by_id = HashMap::with_capacity(responses.len());
    for response in responses {
        if let ResponseId::Number(id) = response.id {
            by_id.entry(id).or_insert(response);
        }
    }
    by_id
}

/// Unpacks one group's response into member outcomes, in member order.
fn group_outcomes(
    group: &BlockGroup,
    response: Option<JsonRpcResponse>,
    id: u64,
) -> Result<Vec<BalanceOutcome>, CallError> {
    let raw = expect_result(response, id)?;
    let data: Bytes = raw
        .parse()
        .map_err(|err| CallError::Decode(format!("result is not hex bytes: {err}")))?;

    let aggregated = IMulticall3::tryBlockAndAggregateCall::abi_decode_returns(&data)
        .map_err(|err| CallError::Decode(format!("aggregate return: {err}")))?;

    if aggregated.returnData.len() != group.calls.len() {
        return Err(CallError::UnexpectedResultCount {
            expected: group.calls.len(),
            actual: aggregated.returnData.len(),
        });
    }

    Ok(group
        .calls
        .iter()
        .zip(aggregated.returnData)
        .map(|(call, member)| {
            if !member.success {
                return Err(CallError::Failed(member.returnData));
            }
            call.kind
                .decode_balance(&member.returnData)
                .map_err(|err| CallError::Decode(format!("balance word: {err}")))
        })
        .collect())
}

/// Decodes one direct-mode response.
fn direct_outcome(kind: &CallKind, response: Option<JsonRpcResponse>, id: u64) -> BalanceOutcome {
    let raw = expect_result(response, id)?;
    match kind {
        CallKind::TokenBalance { .. } => {
            let data: Bytes = raw
                .parse()
                .map_err(|err| CallError::Decode(format!("result is not hex bytes: {err}")))?;
            kind.decode_balance(&data)
                .map_err(|err| CallError::Decode(format!("balance word: {err}")))
        }
        CallKind::NativeBalance { .. } => parse_quantity(&raw),
    }
}

/// Extracts the hex result of a response, converting absence and node
/// errors into the per-slot failures they are.
fn expect_result(response: Option<JsonRpcResponse>, id: u64) -> Result<String, CallError> {
    let response = response.ok_or(CallError::MissingResponse(id))?;
    match response.payload {
        ResponsePayload::Result(raw) => Ok(raw),
        ResponsePayload::Error(err) => Err(CallError::Rpc { code: err.code, message: err.message }),
    }
}

/// Parses a JSON-RPC hex quantity, which unlike ABI words may carry an odd
/// number of nibbles.
fn parse_quantity(raw: &str) -> Result<U256, CallError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    U256::from_str_radix(digits, 16)
        .map_err(|err| CallError::Decode(format!("invalid quantity `{raw}`: {err}")))
}
