//! Common test utilities for server integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use base64::{engine::general_purpose::URL_SAFE, Engine};
use mockmyid_core::{Issuer, KeyPair, SecurityLevel};
use mockmyid_server::{routes, AppState};
use serde_json::Value;

/// Create a test server whose default subject key is already set
///
/// Uses the mockmyid.com key for both roles so no parameters are generated.
pub fn create_test_server() -> TestServer {
    let state = Arc::new(AppState::with_default_key(
        test_issuer(),
        SecurityLevel::L1024N160,
        KeyPair::mockmyid().expect("mockmyid key"),
    ));
    server_for(state, "/")
}

pub fn test_issuer() -> Issuer {
    Issuer::new(Arc::new(KeyPair::mockmyid().expect("mockmyid key")))
}

pub fn server_for(state: Arc<AppState>, prefix: &str) -> TestServer {
    let app = routes::create_router(state, prefix);
    TestServer::new(app).expect("Failed to create test server")
}

/// Decode the payload segment of a padded token
pub fn decode_payload(token: &str) -> Value {
    let segment = token.split('.').nth(1).expect("payload segment");
    serde_json::from_slice(&URL_SAFE.decode(segment).expect("base64")).expect("json")
}
