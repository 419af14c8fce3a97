//! Engine configuration.

use crate::{
    constants::{DEFAULT_AGGREGATE_GAS, DEFAULT_RPC_TIMEOUT, MULTICALL3_ADDRESS, OVERRIDE_CODE_KEY},
    error::ConfigError,
};
use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Configuration for [`BalanceReader`](crate::reader::BalanceReader).
///
/// Everything the engine keys off lives here; there are no ambient
/// globals. The defaults target chains carrying the canonical Multicall3
/// deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Address the aggregate call is sent to.
    pub multicall_address: Address,
    /// Gas ceiling attached to each aggregated `eth_call`.
    pub aggregate_gas: u64,
    /// Runtime bytecode injected at `multicall_address` through a state
    /// override on every aggregate call.
    ///
    /// Unset means the chain is expected to carry the deployment already.
    pub override_code: Option<Bytes>,
    /// Whether a failed block group only fails its own queries.
    ///
    /// When false, any group-level inconsistency fails the whole call
    /// instead.
    pub isolate_groups: bool,
    /// Timeout for one batched exchange.
    pub timeout: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            multicall_address: MULTICALL3_ADDRESS,
            aggregate_gas: DEFAULT_AGGREGATE_GAS,
            override_code: None,
            isolate_groups: true,
            timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl ReaderConfig {
    /// Sets the multicall deployment address.
    pub fn with_multicall_address(mut self, address: Address) -> Self {
        self.multicall_address = address;
        self
    }

    /// Sets the gas ceiling for aggregated calls.
    pub fn with_aggregate_gas(mut self, gas: u64) -> Self {
        self.aggregate_gas = gas;
        self
    }

    /// Sets the bytecode injected through state override.
    pub fn with_override_code(mut self, code: Option<Bytes>) -> Self {
        self.override_code = code;
        self
    }

    /// Sets whether failed groups are isolated from their siblings.
    pub fn with_isolate_groups(mut self, isolate: bool) -> Self {
        self.isolate_groups = isolate;
        self
    }

    /// Sets the exchange timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Reads the multicall runtime bytecode from a metadata file.
///
/// The file is a JSON object whose `state_override_code` entry holds the
/// `0x`-prefixed runtime bytecode, the shape contract build pipelines emit
/// next to their deployment artifacts.
pub fn load_override_code(path: impl AsRef<Path>) -> Result<Bytes, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::OverrideUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    decode_override_metadata(path, &raw)
}

fn decode_override_metadata(path: &Path, raw: &str) -> Result<Bytes, ConfigError> {
    let metadata: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| ConfigError::OverrideMalformed {
            path: path.display().to_string(),
            source,
        })?;

    let code = metadata
        .get(OVERRIDE_CODE_KEY)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ConfigError::OverrideCodeMissing {
            path: path.display().to_string(),
            key: OVERRIDE_CODE_KEY,
        })?;

    code.parse::<Bytes>().map_err(|source| ConfigError::OverrideCodeInvalid {
        path: path.display().to_string(),
        source,
    })
}
