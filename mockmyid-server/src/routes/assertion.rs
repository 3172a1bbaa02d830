//! Backed assertion issuance endpoint

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use mockmyid_core::PublicKey;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssertionQuery {
    pub email: Option<String>,
    pub audience: Option<String>,
    /// Any value asks for a fresh subject key
    #[serde(rename = "uniqueKey")]
    pub unique_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssertionResponse {
    pub email: String,
    pub audience: String,
    pub assertion: String,
    /// Only set for unique keys; the caller has no other way to learn it
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

/// GET /assertion (also served as /login)
/// Issue a short lived backed assertion for `email` and `audience`
pub async fn issue_assertion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssertionQuery>,
) -> Result<Json<AssertionResponse>, ServerError> {
    let email = required(query.email, "email")?;
    let audience = required(query.audience, "audience")?;
    let unique = query.unique_key.is_some();

    let subject = if unique {
        state.generate_unique_key().await?
    } else {
        state.default_key().await?
    };

    let assertion = {
        let state = Arc::clone(&state);
        let subject = Arc::clone(&subject);
        let email = email.clone();
        let audience = audience.clone();
        tokio::task::spawn_blocking(move || {
            state
                .issuer
                .issue_short_lived_assertion(&subject, &email, &audience)
        })
        .await??
    };

    tracing::debug!(%email, %audience, unique, "Issued backed assertion");

    Ok(Json(AssertionResponse {
        email,
        audience,
        assertion,
        public_key: unique.then(|| subject.public_key().clone()),
    }))
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ServerError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ServerError::MissingParameter(name))
}
