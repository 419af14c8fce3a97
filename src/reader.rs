//! Balance read pipeline.

use crate::{
    config::ReaderConfig,
    demux::{self, BalanceOutcome},
    encode::CallKind,
    error::{ReaderError, TransportError},
    group::BlockGroups,
    payload,
    transport::BatchTransport,
    types::{BalanceQuery, JsonRpcRequest, JsonRpcResponse},
};
use tracing::{debug, instrument, warn};

/// Order-preserving bulk balance reads over batched `eth_call`.
///
/// One invocation plans its queries into per-block groups, folds each group
/// into a Multicall3 aggregate, ships all of them as a single batched
/// JSON-RPC exchange bounded by the configured timeout and scatters the
/// nested results back onto the input order. Instances hold no state
/// between calls; invocations are independent and safe to issue
/// concurrently.
#[derive(Debug)]
pub struct BalanceReader<T> {
    config: ReaderConfig,
    transport: T,
}

impl<T> BalanceReader<T> {
    /// Creates a reader with default configuration.
    pub fn new(transport: T) -> Self {
        Self { config: ReaderConfig::default(), transport }
    }

    /// Creates a reader with the given configuration.
    pub fn with_config(transport: T, config: ReaderConfig) -> Self {
        Self { config, transport }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<T: BatchTransport> BalanceReader<T> {
    /// Ships one batch through the transport, bounded by the configured
    /// timeout. Expiry abandons the exchange whole; no partial responses
    /// survive it.
    async fn exchange(
        &self,
        batch: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        match tokio::time::timeout(self.config.timeout, self.transport.send_batch(batch)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.config.timeout, "rpc batch timed out");
                Err(TransportError::Timeout { timeout: self.config.timeout })
            }
        }
    }

    /// Reads every queried balance through per-block aggregates.
    ///
    /// The output aligns index for index with `queries`: a balance for each
    /// answered query, a [`CallError`](crate::error::CallError) for each
    /// failed one. One request leaves per distinct block; a failed member
    /// never disturbs its siblings.
    #[instrument(skip_all, fields(queries = queries.len()))]
    pub async fn balances(
        &self,
        queries: &[BalanceQuery],
    ) -> Result<Vec<BalanceOutcome>, ReaderError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let groups = BlockGroups::plan(queries);
        let batch = groups
            .iter()
            .enumerate()
            .map(|(position, group)| {
                payload::group_request(group, position as u64 + 1, &self.config)
            })
            .collect::<Result<Vec<JsonRpcRequest>, _>>()?;

        debug!(groups = groups.len(), "sending aggregated balance batch");

        let responses = self.exchange(batch).await?;
        demux::demux(&groups, responses, &self.config)
    }

    /// Reads balances with one plain call per query, no aggregation.
    ///
    /// Token queries go through a bare `eth_call` of `balanceOf`, native
    /// queries through `eth_getBalance`. Same output contract as
    /// [`Self::balances`], at one request per query instead of one per
    /// block. Useful against nodes that reject state overrides or carry no
    /// multicall deployment.
    #[instrument(skip_all, fields(queries = queries.len()))]
    pub async fn balances_direct(
        &self,
        queries: &[BalanceQuery],
    ) -> Result<Vec<BalanceOutcome>, ReaderError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let kinds: Vec<CallKind> = queries.iter().map(CallKind::from_query).collect();
        let batch = kinds
            .iter()
            .zip(queries)
            .enumerate()
            .map(|(position, (kind, query))| {
                payload::direct_request(kind, query.block, position as u64 + 1)
            })
            .collect::<Result<Vec<JsonRpcRequest>, _>>()?;

        debug!(requests = batch.len(), "sending direct balance batch");

        let responses = self.exchange(batch).await?;
        Ok(demux::demux_direct(&kinds, responses))
    }
}
