// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the Stellar RPC client over HTTP
//!
//! A mockito server stands in for the node, so requests go through the full
//! alloy HTTP transport and the logging layer.

mod helpers;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use stellar_block_fetcher::rpc::Ledger;
use stellar_block_fetcher::{
    ErrorKind, FetchError, Fetcher, FetcherConfig, FetcherConfigBuilder, Network, RpcError,
    StellarRpcClient,
};
use tokio_util::sync::CancellationToken;

use helpers::{ledger_hash, rpc_ledger, rpc_transactions, transactions};

const BLOCK: u32 = 55_253_347;

fn client(server: &ServerGuard) -> StellarRpcClient {
    let config = FetcherConfigBuilder::new().rpc_logging(true).build();
    StellarRpcClient::new(&server.url(), &config).unwrap()
}

fn result(result: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 0, "result": result }).to_string()
}

fn ledger_json(ledger: &Ledger) -> Value {
    json!({
        "hash": hex::encode(ledger.hash),
        "sequence": ledger.sequence,
        "ledgerCloseTime": ledger.close_time.to_string(),
        "headerXdr": STANDARD.encode(&ledger.header_xdr),
        "metadataXdr": STANDARD.encode(&ledger.metadata_xdr),
    })
}

fn latest_ledger_json(sequence: u32) -> Value {
    json!({
        "id": hex::encode(ledger_hash(sequence)),
        "protocolVersion": 23,
        "sequence": sequence,
    })
}

async fn mock_method(server: &mut ServerGuard, method: &str, body: String) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_get_latest_ledger_over_http() {
    let mut server = Server::new_async().await;
    let mock = mock_method(&mut server, "getLatestLedger", result(latest_ledger_json(BLOCK))).await;

    let head = client(&server)
        .get_latest_ledger(&CancellationToken::new())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(head.sequence, BLOCK);
    assert_eq!(head.id, ledger_hash(BLOCK));
    assert_eq!(head.protocol_version, 23);
}

#[tokio::test]
async fn test_get_ledgers_decodes_hex_and_base64() {
    let ledger = rpc_ledger(BLOCK, &Network::Mainnet, &transactions(2));
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "getLedgers",
            "params": { "startLedger": BLOCK, "pagination": { "limit": 1 } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(result(json!({
            "ledgers": [ledger_json(&ledger)],
            "latestLedger": BLOCK + 5,
            "cursor": BLOCK.to_string(),
        })))
        .create_async()
        .await;

    let ledgers = client(&server)
        .get_ledgers(&CancellationToken::new(), BLOCK)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ledgers, vec![ledger]);
}

#[tokio::test]
async fn test_http_error_status_is_transport_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = client(&server)
        .get_latest_ledger(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::Transport { .. }));
    assert_eq!(FetchError::from(err).kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_error_object_is_protocol_failure() {
    let mut server = Server::new_async().await;
    let body = json!({
        "jsonrpc": "2.0",
        "id": 0,
        "error": { "code": -32600, "message": "start ledger must be between the oldest ledger: 1 and the latest ledger: 10" }
    })
    .to_string();
    let _mock = mock_method(&mut server, "getLedgers", body).await;

    let err = client(&server)
        .get_ledgers(&CancellationToken::new(), BLOCK)
        .await
        .unwrap_err();

    match &err {
        RpcError::Rpc {
            operation, code, ..
        } => {
            assert_eq!(operation, "getLedgers");
            assert_eq!(*code, -32600);
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
    assert_eq!(FetchError::from(err).kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_unknown_field_is_malformed_response() {
    let mut server = Server::new_async().await;
    let mut head = latest_ledger_json(BLOCK);
    head["unexpected"] = json!(true);
    let _mock = mock_method(&mut server, "getLatestLedger", result(head)).await;

    let err = client(&server)
        .get_latest_ledger(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_bad_base64_is_decode_failure() {
    let mut ledger = ledger_json(&rpc_ledger(BLOCK, &Network::Mainnet, &[]));
    ledger["metadataXdr"] = json!("not base64 at all!");
    let mut server = Server::new_async().await;
    let _mock = mock_method(
        &mut server,
        "getLedgers",
        result(json!({ "ledgers": [ledger], "latestLedger": BLOCK })),
    )
    .await;

    let err = client(&server)
        .get_ledgers(&CancellationToken::new(), BLOCK)
        .await
        .unwrap_err();

    assert!(matches!(err, RpcError::InvalidPayload { .. }));
    assert_eq!(FetchError::from(err).kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_get_transactions_follows_cursor_until_empty_page() {
    let txs = transactions(3);
    let records = rpc_transactions(BLOCK, &Network::Mainnet, &txs);
    let tx_json = |i: usize| {
        let tx = &records[i];
        json!({
            "status": tx.status,
            "txHash": hex::encode(tx.hash),
            "applicationOrder": tx.application_order,
            "feeBump": false,
            "envelopeXdr": STANDARD.encode(&tx.envelope_xdr),
            "resultXdr": STANDARD.encode(&tx.result_xdr),
            "resultMetaXdr": STANDARD.encode(&tx.result_meta_xdr),
            "ledger": tx.ledger,
            "createdAt": tx.created_at,
        })
    };
    let first_cursor = "0237311318360358912-0000000002";
    let second_cursor = "0237311318360358912-0000000003";

    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "getTransactions",
            "params": { "startLedger": BLOCK, "pagination": { "limit": 2 } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(result(json!({
            "transactions": [tx_json(0), tx_json(1)],
            "latestLedger": BLOCK + 1,
            "cursor": first_cursor,
        })))
        .create_async()
        .await;
    let second = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "getTransactions",
            "params": { "pagination": { "cursor": first_cursor, "limit": 2 } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(result(json!({
            "transactions": [tx_json(2)],
            "latestLedger": BLOCK + 1,
            "cursor": second_cursor,
        })))
        .create_async()
        .await;
    let third = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "getTransactions",
            "params": { "pagination": { "cursor": second_cursor, "limit": 2 } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(result(json!({
            "transactions": [],
            "latestLedger": BLOCK + 1,
            "cursor": second_cursor,
        })))
        .create_async()
        .await;

    let (cursor, fetched) = client(&server)
        .get_transactions(&CancellationToken::new(), BLOCK, 2, None)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;
    assert_eq!(fetched.len(), 3);
    assert_eq!(
        fetched.iter().map(|tx| tx.hash).collect::<Vec<_>>(),
        records.iter().map(|tx| tx.hash).collect::<Vec<_>>()
    );
    assert_eq!(cursor.unwrap().as_str(), second_cursor);
    // No events object on the wire
    assert!(fetched.iter().all(|tx| tx.events.is_none()));
}

#[tokio::test]
async fn test_get_transaction_by_hash() {
    let txs = transactions(1);
    let record = rpc_transactions(BLOCK, &Network::Mainnet, &txs).remove(0);
    let hash = hex::encode(record.hash);
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({
            "method": "getTransaction",
            "params": { "hash": hash }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(result(json!({
            "latestLedger": BLOCK + 1,
            "oldestLedger": BLOCK - 100,
            "status": record.status,
            "txHash": hash,
            "applicationOrder": 1,
            "feeBump": false,
            "envelopeXdr": STANDARD.encode(&record.envelope_xdr),
            "resultXdr": STANDARD.encode(&record.result_xdr),
            "resultMetaXdr": STANDARD.encode(&record.result_meta_xdr),
            "ledger": BLOCK,
            "createdAt": record.created_at,
        })))
        .create_async()
        .await;

    let fetched = client(&server)
        .get_transaction(&CancellationToken::new(), &hash)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(fetched.hash, record.hash);
    assert_eq!(fetched.ledger, BLOCK);
    assert_eq!(fetched.status, record.status);
    assert_eq!(fetched.envelope_xdr, record.envelope_xdr);
}

#[tokio::test]
async fn test_get_transaction_not_found_is_a_record() {
    let mut server = Server::new_async().await;
    let _mock = mock_method(
        &mut server,
        "getTransaction",
        result(json!({
            "latestLedger": BLOCK,
            "oldestLedger": BLOCK - 100,
            "status": "NOT_FOUND",
        })),
    )
    .await;

    let fetched = client(&server)
        .get_transaction(&CancellationToken::new(), &"ab".repeat(32))
        .await
        .unwrap();

    assert_eq!(fetched.status, "NOT_FOUND");
    assert_eq!(fetched.hash, [0u8; 32]);
    assert_eq!(fetched.ledger, 0);
    assert!(fetched.envelope_xdr.is_empty());
}

#[tokio::test]
async fn test_fetcher_over_http() {
    let txs = transactions(4);
    let ledger = rpc_ledger(BLOCK, &Network::Mainnet, &txs);
    let mut server = Server::new_async().await;
    let _head = mock_method(&mut server, "getLatestLedger", result(latest_ledger_json(BLOCK))).await;
    let _ledgers = mock_method(
        &mut server,
        "getLedgers",
        result(json!({ "ledgers": [ledger_json(&ledger)], "latestLedger": BLOCK })),
    )
    .await;

    let config = FetcherConfig::minimal();
    let client = StellarRpcClient::new(&server.url(), &config).unwrap();
    let fetcher = Fetcher::new(config);

    let fetched = fetcher
        .fetch(&CancellationToken::new(), &client, u64::from(BLOCK))
        .await
        .unwrap();

    assert_eq!(fetched.block.number, u64::from(BLOCK));
    assert_eq!(fetched.block.id, hex::encode(ledger_hash(BLOCK)));
    assert_eq!(fetched.block.lib_num, u64::from(BLOCK) - 1);
    assert!(fetcher.is_block_available(u64::from(BLOCK)));
}
