//! Default public key endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use mockmyid_core::PublicKey;

use crate::error::ServerError;
use crate::state::AppState;

/// GET /key
/// The default subject key's public numbers, hex encoded
pub async fn get_key(State(state): State<Arc<AppState>>) -> Result<Json<PublicKey>, ServerError> {
    let key = state.default_key().await?;
    Ok(Json(key.public_key().clone()))
}
