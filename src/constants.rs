//! Engine constants.

use alloy::primitives::{Address, address};
use std::time::Duration;

/// Canonical Multicall3 deployment address, identical on every supported
/// chain.
///
/// See also <https://github.com/mds1/multicall#multicall3-contract-addresses>
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Default gas ceiling attached to each aggregated `eth_call`.
///
/// Sized for groups of several hundred balance reads. Nodes reject the call
/// outright when an aggregate would exceed it, instead of burning time on a
/// runaway execution.
pub const DEFAULT_AGGREGATE_GAS: u64 = 50_000_000;

/// Default timeout for one batched RPC exchange.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON key under which override metadata files store the multicall runtime
/// bytecode.
pub const OVERRIDE_CODE_KEY: &str = "state_override_code";
