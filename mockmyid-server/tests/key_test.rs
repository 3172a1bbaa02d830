//! Tests for the /key endpoint

mod common;

use std::sync::Arc;

use common::{create_test_server, server_for, test_issuer};
use mockmyid_core::{KeyPair, SecurityLevel};
use mockmyid_server::AppState;
use serde_json::Value;

/// Test: /key returns the default key's hex numbers
#[tokio::test]
async fn test_key_returns_public_numbers() {
    let server = create_test_server();
    let expected = KeyPair::mockmyid().unwrap();

    let response = server.get("/key").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["algorithm"], "DS");
    for field in ["y", "p", "q", "g"] {
        let value = body[field].as_str().unwrap();
        assert!(value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
    assert_eq!(body["y"], expected.public_key().y.as_str());
    assert!(body.get("x").is_none());
}

/// Test: the default key is generated lazily, once
#[tokio::test]
async fn test_default_key_generated_once() {
    let state = Arc::new(AppState::new(test_issuer(), SecurityLevel::L1024N160));
    let server = server_for(Arc::clone(&state), "/");

    let first: Value = server.get("/key").await.json();
    let second: Value = server.get("/key").await.json();

    assert_eq!(first["y"], second["y"]);
    assert_eq!(first["p"], second["p"]);

    let key = state.default_key().await.unwrap();
    assert_eq!(first["y"], key.public_key().y.as_str());
}

/// Test: concurrent first callers share a single generated key
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_key_concurrent_first_callers() {
    let state = Arc::new(AppState::new(test_issuer(), SecurityLevel::L1024N160));

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let state = Arc::clone(&state);
        set.spawn(async move { state.default_key().await.unwrap() });
    }

    let mut keys = Vec::new();
    while let Some(key) = set.join_next().await {
        keys.push(key.unwrap());
    }

    assert_eq!(keys.len(), 8);
    let first = &keys[0];
    assert!(keys.iter().all(|key| Arc::ptr_eq(key, first)));

    let after = state.default_key().await.unwrap();
    assert!(Arc::ptr_eq(&after, first));
}
