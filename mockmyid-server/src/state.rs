//! Server state management

use std::sync::Arc;

use tokio::sync::OnceCell;

use mockmyid_core::{Issuer, KeyPair, SecurityLevel};

use crate::error::ServerError;

/// Server application state
pub struct AppState {
    /// Builds and signs backed assertions
    pub issuer: Issuer,

    /// Parameter size for the default and per-request subject keys
    pub security_level: SecurityLevel,

    /// Subject key shared by requests that don't ask for a unique one.
    /// Written once, read-only afterwards.
    default_key: OnceCell<Arc<KeyPair>>,
}

impl AppState {
    /// Create state whose default key is generated on first use
    pub fn new(issuer: Issuer, security_level: SecurityLevel) -> Self {
        Self {
            issuer,
            security_level,
            default_key: OnceCell::new(),
        }
    }

    /// Create state with a ready-made default key
    pub fn with_default_key(issuer: Issuer, security_level: SecurityLevel, key: KeyPair) -> Self {
        Self {
            issuer,
            security_level,
            default_key: OnceCell::new_with(Some(Arc::new(key))),
        }
    }

    /// Get the default subject key, generating it if this is the first call
    ///
    /// Concurrent first callers wait on a single generation.
    pub async fn default_key(&self) -> Result<Arc<KeyPair>, ServerError> {
        let level = self.security_level;
        let key = self
            .default_key
            .get_or_try_init(|| async move {
                tracing::info!(%level, "Generating default subject key");
                generate_key(level).await
            })
            .await?;
        Ok(Arc::clone(key))
    }

    /// Generate a subject key for a single request
    pub async fn generate_unique_key(&self) -> Result<Arc<KeyPair>, ServerError> {
        generate_key(self.security_level).await
    }
}

// Parameter generation is CPU bound; keep it off the async workers
async fn generate_key(level: SecurityLevel) -> Result<Arc<KeyPair>, ServerError> {
    let key = tokio::task::spawn_blocking(move || KeyPair::generate(level)).await??;
    Ok(Arc::new(key))
}
