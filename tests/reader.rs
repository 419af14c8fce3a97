//! Pipeline tests driving [`BalanceReader`] through a scripted transport.

use alloy::{
    primitives::{Address, B256, Bytes, U256, address},
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;
use std::{sync::Mutex, time::Duration};
use tally::{
    config::ReaderConfig,
    error::{CallError, ReaderError, TransportError},
    reader::BalanceReader,
    transport::BatchTransport,
    types::{BalanceQuery, IMulticall3, JsonRpcRequest, JsonRpcResponse},
};

const WALLET: Address = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
const TOKEN_A: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
const TOKEN_B: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// Transport double that records the outgoing batch and replays a scripted
/// reply.
struct MockTransport {
    reply: Mutex<Option<Result<Vec<JsonRpcResponse>, TransportError>>>,
    sent: Mutex<Vec<JsonRpcRequest>>,
}

impl MockTransport {
    fn replying(reply: Result<Vec<JsonRpcResponse>, TransportError>) -> Self {
        Self { reply: Mutex::new(Some(reply)), sent: Mutex::new(Vec::new()) }
    }

    fn sent(&self) -> Vec<JsonRpcRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl<'a> BatchTransport for &'a MockTransport {
    async fn send_batch(
        &self,
        batch: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        self.sent.lock().unwrap().extend(batch.iter().cloned());
        self.reply.lock().unwrap().take().unwrap_or(Ok(Vec::new()))
    }
}

/// Transport double that stalls past any deadline a test would configure.
struct StallingTransport;

#[async_trait]
impl BatchTransport for StallingTransport {
    async fn send_batch(
        &self,
        _batch: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        tokio::time::sleep(Duration::from_millis(250)).await;
        Ok(Vec::new())
    }
}

fn word(value: u64) -> Bytes {
    U256::from(value).abi_encode().into()
}

fn member(value: u64) -> IMulticall3::Result {
    IMulticall3::Result { success: true, returnData: word(value) }
}

fn aggregate_result(id: u64, block: u64, members: Vec<IMulticall3::Result>) -> JsonRpcResponse {
    let encoded = (U256::from(block), B256::ZERO, members).abi_encode_params();
    JsonRpcResponse::result(id, format!("0x{}", alloy::hex::encode(encoded)))
}

#[tokio::test]
async fn balances_align_with_queries() {
    // Three queries over two blocks: one request per block, answers land
    // back on the slots the questions came from.
    let queries = [
        BalanceQuery::token(WALLET, TOKEN_A, 100),
        BalanceQuery::native(WALLET, 200),
        BalanceQuery::token(WALLET, TOKEN_B, 100),
    ];

    let transport = MockTransport::replying(Ok(vec![
        aggregate_result(1, 100, vec![member(11), member(33)]),
        aggregate_result(2, 200, vec![member(22)]),
    ]));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances(&queries).await.unwrap();
    assert_eq!(outcomes.len(), queries.len());
    assert_eq!(outcomes[0], Ok(U256::from(11u64)));
    assert_eq!(outcomes[1], Ok(U256::from(22u64)));
    assert_eq!(outcomes[2], Ok(U256::from(33u64)));

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|request| request.method == "eth_call"));
    assert_eq!(sent[0].id, 1);
    assert_eq!(sent[1].id, 2);
}

#[tokio::test]
async fn requests_follow_first_seen_block_order() {
    let queries = [
        BalanceQuery::native(WALLET, 9),
        BalanceQuery::native(WALLET, 5),
        BalanceQuery::native(WALLET, 9),
        BalanceQuery::native(WALLET, 1),
    ];

    let transport = MockTransport::replying(Ok(vec![
        aggregate_result(1, 9, vec![member(1), member(2)]),
        aggregate_result(2, 5, vec![member(3)]),
        aggregate_result(3, 1, vec![member(4)]),
    ]));
    let reader = BalanceReader::new(&transport);
    reader.balances(&queries).await.unwrap();

    let blocks: Vec<String> = transport
        .sent()
        .iter()
        .map(|request| request.params[1].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(blocks, vec!["0x9", "0x5", "0x1"]);
}

#[tokio::test]
async fn responses_pair_by_id_not_position() {
    let queries = [BalanceQuery::native(WALLET, 7), BalanceQuery::native(WALLET, 8)];

    // Replies arrive in reverse order; pairing still goes by id.
    let transport = MockTransport::replying(Ok(vec![
        aggregate_result(2, 8, vec![member(88)]),
        aggregate_result(1, 7, vec![member(77)]),
    ]));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances(&queries).await.unwrap();
    assert_eq!(outcomes[0], Ok(U256::from(77u64)));
    assert_eq!(outcomes[1], Ok(U256::from(88u64)));
}

#[tokio::test]
async fn failed_member_keeps_siblings_intact() {
    let queries = [
        BalanceQuery::token(WALLET, TOKEN_A, 50),
        BalanceQuery::token(WALLET, TOKEN_B, 50),
    ];

    let transport = MockTransport::replying(Ok(vec![aggregate_result(
        1,
        50,
        vec![
            IMulticall3::Result { success: false, returnData: Bytes::new() },
            member(9),
        ],
    )]));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances(&queries).await.unwrap();
    assert_eq!(outcomes[0], Err(CallError::Failed(Bytes::new())));
    assert_eq!(outcomes[1], Ok(U256::from(9u64)));
}

#[tokio::test]
async fn transport_failure_fails_the_whole_call() {
    let queries = [BalanceQuery::native(WALLET, 1)];

    let transport = MockTransport::replying(Err(TransportError::Status { status: 503 }));
    let reader = BalanceReader::new(&transport);

    let err = reader.balances(&queries).await.unwrap_err();
    assert!(matches!(err, ReaderError::Transport(TransportError::Status { status: 503 })));
}

#[tokio::test]
async fn configured_timeout_bounds_the_exchange() {
    let queries = [BalanceQuery::native(WALLET, 1)];
    let config = ReaderConfig::default().with_timeout(Duration::from_millis(10));
    let reader = BalanceReader::with_config(StallingTransport, config);

    let err = reader.balances(&queries).await.unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Transport(TransportError::Timeout { timeout })
            if timeout == Duration::from_millis(10)
    ));
}

#[tokio::test]
async fn direct_mode_respects_the_configured_timeout() {
    let queries = [BalanceQuery::token(WALLET, TOKEN_A, 2)];
    let config = ReaderConfig::default().with_timeout(Duration::from_millis(10));
    let reader = BalanceReader::with_config(StallingTransport, config);

    let err = reader.balances_direct(&queries).await.unwrap_err();
    assert!(matches!(err, ReaderError::Transport(TransportError::Timeout { .. })));
}

#[tokio::test]
async fn missing_group_response_is_isolated_by_default() {
    let queries = [BalanceQuery::native(WALLET, 1), BalanceQuery::native(WALLET, 2)];

    let transport =
        MockTransport::replying(Ok(vec![aggregate_result(1, 1, vec![member(5)])]));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances(&queries).await.unwrap();
    assert_eq!(outcomes[0], Ok(U256::from(5u64)));
    assert_eq!(outcomes[1], Err(CallError::MissingResponse(2)));
}

#[tokio::test]
async fn strict_groups_escalate_group_failures() {
    let queries = [BalanceQuery::native(WALLET, 1), BalanceQuery::native(WALLET, 2)];

    let transport =
        MockTransport::replying(Ok(vec![aggregate_result(1, 1, vec![member(5)])]));
    let config = ReaderConfig::default().with_isolate_groups(false);
    let reader = BalanceReader::with_config(&transport, config);

    let err = reader.balances(&queries).await.unwrap_err();
    assert!(matches!(err, ReaderError::Group { block: 2, .. }));
}

#[tokio::test]
async fn node_errors_mark_their_group() {
    let queries = [
        BalanceQuery::native(WALLET, 1),
        BalanceQuery::native(WALLET, 2),
        BalanceQuery::native(WALLET, 1),
    ];

    let transport = MockTransport::replying(Ok(vec![
        aggregate_result(1, 1, vec![member(1), member(3)]),
        JsonRpcResponse::error(2, -32000, "execution aborted"),
    ]));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances(&queries).await.unwrap();
    assert_eq!(outcomes[0], Ok(U256::from(1u64)));
    assert_eq!(
        outcomes[1],
        Err(CallError::Rpc { code: -32000, message: "execution aborted".into() })
    );
    assert_eq!(outcomes[2], Ok(U256::from(3u64)));
}

#[tokio::test]
async fn override_code_rides_along_when_configured() {
    let queries = [BalanceQuery::native(WALLET, 3)];
    let code = Bytes::from(vec![0x60, 0x80]);

    let transport =
        MockTransport::replying(Ok(vec![aggregate_result(1, 3, vec![member(1)])]));
    let config = ReaderConfig::default().with_override_code(Some(code));
    let reader = BalanceReader::with_config(&transport, config);
    reader.balances(&queries).await.unwrap();

    let sent = transport.sent();
    let params = sent[0].params.as_array().unwrap();
    assert_eq!(params.len(), 3);
    let account = &params[2][format!("{:#x}", reader.config().multicall_address)];
    assert_eq!(account["code"], "0x6080");
}

#[tokio::test]
async fn empty_query_set_sends_nothing() {
    let transport = MockTransport::replying(Ok(Vec::new()));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances(&[]).await.unwrap();
    assert!(outcomes.is_empty());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn direct_mode_splits_token_and_native_calls() {
    let queries = [
        BalanceQuery::token(WALLET, TOKEN_A, 40),
        BalanceQuery::native(WALLET, 41),
    ];

    let transport = MockTransport::replying(Ok(vec![
        JsonRpcResponse::result(1, format!("0x{}", alloy::hex::encode(word(64)))),
        JsonRpcResponse::result(2, "0x407"),
    ]));
    let reader = BalanceReader::new(&transport);

    let outcomes = reader.balances_direct(&queries).await.unwrap();
    assert_eq!(outcomes[0], Ok(U256::from(64u64)));
    assert_eq!(outcomes[1], Ok(U256::from(0x407u64)));

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].method, "eth_call");
    assert_eq!(sent[1].method, "eth_getBalance");
}

#[tokio::test]
async fn aggregates_carry_every_member_of_their_block() {
    let queries = [
        BalanceQuery::token(WALLET, TOKEN_A, 60),
        BalanceQuery::native(WALLET, 60),
        BalanceQuery::token(WALLET, TOKEN_B, 61),
    ];

    let transport = MockTransport::replying(Ok(vec![
        aggregate_result(1, 60, vec![member(1), member(2)]),
        aggregate_result(2, 61, vec![member(3)]),
    ]));
    let reader = BalanceReader::new(&transport);
    reader.balances(&queries).await.unwrap();

    let sent = transport.sent();
    let data: Bytes = sent[0].params[0]["data"].as_str().unwrap().parse().unwrap();
    let decoded = IMulticall3::tryBlockAndAggregateCall::abi_decode(&data).unwrap();

    assert!(!decoded.requireSuccess);
    assert_eq!(decoded.calls.len(), 2);
    assert_eq!(decoded.calls[0].target, TOKEN_A);
    assert_eq!(decoded.calls[1].target, reader.config().multicall_address);
}
