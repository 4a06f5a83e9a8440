//! Concurrent access: many clients hitting one store at the same time.
//!
//! Tests verify that concurrent creates never collide, that lookups during
//! churn see either the whole session or nothing, and that a self-destroy
//! racing the sweeper resolves to exactly one winner.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Barrier;

use rpc_session::{SessionConfig, SessionError, SessionStore};
use rpc_session_server::types::{JsonRpcMessage, JsonRpcRequest, RequestId};
use rpc_session_server::{CallContext, ProtocolHandler, ServerConfig};
use serde_json::{json, Value};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler(timeout: Option<u64>) -> Arc<ProtocolHandler> {
    let config = ServerConfig {
        session: SessionConfig {
            timeout,
            ..SessionConfig::default()
        },
        ..ServerConfig::default()
    };
    let store = Arc::new(SessionStore::new(config.session.clone()));
    Arc::new(ProtocolHandler::new(store, &config))
}

fn call(
    handler: &ProtocolHandler,
    method: &str,
    params: Option<Value>,
    session: Option<&str>,
) -> Value {
    let mut req = JsonRpcRequest::new(RequestId::Number(1), method, params);
    if let Some(token) = session {
        req = req.with_session(token);
    }
    handler
        .handle_message(JsonRpcMessage::Request(req), &CallContext::default())
        .unwrap()
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// Many clients creating sessions at once all get distinct ids.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates() {
    let handler = create_handler(None);
    let barrier = Arc::new(Barrier::new(8));
    let mut handles = vec![];

    for _ in 0..8 {
        let handler = handler.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            (0..100)
                .map(|_| {
                    call(&handler, "session/create", None, None)["result"]
                        .as_str()
                        .unwrap()
                        .to_string()
                })
                .collect::<Vec<_>>()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.extend(handle.await.unwrap());
    }
    assert_eq!(ids.len(), 800);
    assert_eq!(handler.store().len(), 800);
}

/// Readers listing while writers create and destroy never see torn state.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_list_during_churn() {
    let handler = create_handler(None);
    let store = handler.store().clone();
    let barrier = Arc::new(Barrier::new(3));

    let writer = {
        let store = store.clone();
        let barrier = barrier.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            for _ in 0..500 {
                let id = store.create();
                store.destroy_by_id(&id).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                for _ in 0..500 {
                    for summary in store.list() {
                        assert!(summary.last_used_at >= summary.created_at);
                    }
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert!(store.is_empty());
}

/// A session destroying itself while the sweeper evicts it: one wins.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_destroy_races_sweep() {
    for _ in 0..50 {
        let handler = create_handler(Some(1));
        let store = handler.store().clone();
        let id = store.create_at(0);
        let session = store.get_by_id(&id).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let destroyer = {
            let store = store.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                store.destroy(&session)
            })
        };
        let sweeper = {
            let store = store.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                store.sweep_at(100)
            })
        };

        let destroyed = destroyer.await.unwrap();
        let swept = sweeper.await.unwrap();

        match destroyed {
            Ok(()) => assert_eq!(swept, 0),
            Err(SessionError::NotFound(_)) => assert_eq!(swept, 1),
            Err(other) => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty());
    }
}

/// Concurrent subscribe calls on one session agree on who added the topic.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_subscribe_single_winner() {
    let handler = create_handler(None);
    let id = call(&handler, "session/create", None, None)["result"]
        .as_str()
        .unwrap()
        .to_string();
    let barrier = Arc::new(Barrier::new(6));
    let mut handles = vec![];

    for _ in 0..6 {
        let handler = handler.clone();
        let barrier = barrier.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            call(&handler, "session/push/subscribe", Some(json!("feed")), Some(&id))["result"]
                .as_bool()
                .unwrap()
        }));
    }

    let mut added = 0;
    for handle in handles {
        if handle.await.unwrap() {
            added += 1;
        }
    }
    assert_eq!(added, 1);
}
