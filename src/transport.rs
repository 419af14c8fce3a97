//! Batched JSON-RPC transport.

use crate::{
    error::TransportError,
    types::{JsonRpcRequest, JsonRpcResponse},
};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Carrier for one batched JSON-RPC exchange.
///
/// Implementations ship the whole batch in one round trip and hand back
/// whatever responses the node produced. Pairing responses to requests is
/// id-based and happens downstream, so response order carries no meaning
/// here. Deadlines are owned by the caller, which brackets the exchange as
/// a whole.
#[async_trait]
pub trait BatchTransport {
    /// Sends the batch and returns the raw responses.
    async fn send_batch(
        &self,
        batch: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError>;
}

/// HTTP transport posting the batch as one JSON array.
///
/// The node answers with a JSON array of responses; gzip response bodies
/// are transparently decompressed.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport against the given endpoint.
    pub fn new(endpoint: Url) -> Self {
        Self { client: Client::new(), endpoint }
    }
}

#[async_trait]
impl BatchTransport for HttpTransport {
    async fn send_batch(
        &self,
        batch: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        debug!(requests = batch.len(), endpoint = %self.endpoint, "sending rpc batch");

        let response = self.client.post(self.endpoint.clone()).json(&batch).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
