//! Stress tests: many sessions, many topics, many pushes.
//!
//! Tests verify that fan-out delivery stays exact under load and that a long
//! stdio script produces one response per request, in order.

use std::sync::Arc;
use std::time::Instant;

use rpc_session::{ChannelConnection, SessionConfig, SessionStore};
use rpc_session_server::types::{JsonRpcMessage, JsonRpcRequest, RequestId};
use rpc_session_server::{CallContext, ProtocolHandler, ServerConfig, StdioTransport};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler() -> ProtocolHandler {
    let config = ServerConfig::default();
    let store = Arc::new(SessionStore::new(SessionConfig::default()));
    ProtocolHandler::new(store, &config)
}

fn call(
    handler: &ProtocolHandler,
    method: &str,
    params: Option<Value>,
    session: Option<&str>,
    ctx: &CallContext,
) -> Value {
    let mut req = JsonRpcRequest::new(RequestId::Number(1), method, params);
    if let Some(token) = session {
        req = req.with_session(token);
    }
    handler
        .handle_message(JsonRpcMessage::Request(req), ctx)
        .unwrap()
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// 200 sessions over 10 topics; every publish reaches exactly its subscribers.
#[tokio::test]
async fn test_fan_out_is_exact() {
    let handler = create_handler();
    let mut receivers = Vec::new();

    for i in 0..200 {
        let (connection, rx) = ChannelConnection::new();
        let ctx = CallContext::with_connection(Arc::new(connection));
        let id = call(&handler, "session/create", None, None, &ctx)["result"]
            .as_str()
            .unwrap()
            .to_string();
        let topic = format!("topic-{}", i % 10);
        let response = call(
            &handler,
            "session/push/subscribe",
            Some(json!(topic)),
            Some(&id),
            &ctx,
        );
        assert_eq!(response["result"], json!(true));
        receivers.push((i % 10, rx));
    }

    let start = Instant::now();
    for round in 0..50 {
        for t in 0..10 {
            let delivered = handler
                .store()
                .publish(&format!("topic-{t}"), json!({"round": round}));
            assert_eq!(delivered, 20);
        }
    }
    let elapsed = start.elapsed();
    println!("10000 pushes in {elapsed:?}");

    for (topic, mut rx) in receivers {
        let mut count = 0;
        while let Ok(text) = rx.try_recv() {
            let push: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(push["subject"], format!("topic-{topic}"));
            count += 1;
        }
        assert_eq!(count, 50);
    }
}

/// Subscribe and unsubscribe churn leaves each session with a consistent set.
#[test]
fn test_subscription_churn() {
    let handler = create_handler();
    let ctx = CallContext::default();
    let id = call(&handler, "session/create", None, None, &ctx)["result"]
        .as_str()
        .unwrap()
        .to_string();

    let topics: Vec<String> = (0..100).map(|i| format!("t{i:03}")).collect();
    for _ in 0..20 {
        call(&handler, "session/push/subscribe", Some(json!(topics)), Some(&id), &ctx);
        let odd: Vec<&String> = topics.iter().skip(1).step_by(2).collect();
        call(&handler, "session/push/unsubscribe", Some(json!(odd)), Some(&id), &ctx);
    }

    let session = handler.store().get_by_str(&id).unwrap();
    let expected: Vec<String> = topics.iter().step_by(2).cloned().collect();
    assert_eq!(session.subscriptions(), expected);
}

/// A long stdio script answers every request, in order.
#[tokio::test]
async fn test_stdio_long_script() {
    let transport = StdioTransport::new(create_handler());

    let mut script = String::new();
    for i in 0..1000 {
        script.push_str(&format!(
            "{{\"jsonrpc\":\"2.0\",\"id\":{i},\"method\":\"session/create\"}}\n"
        ));
    }

    let (writer, mut output) = tokio::io::duplex(1 << 20);
    transport.run_with(script.as_bytes(), writer).await.unwrap();

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    let responses: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 1000);
    for (i, response) in responses.iter().enumerate() {
        assert_eq!(response["id"], i as u64);
        assert!(response["result"].is_string());
    }
    assert_eq!(transport.handler().store().len(), 1000);
}
