//! MockMyID Server
//!
//! Issues BrowserID backed assertions for `@mockmyid.com` addresses
//! on request, for automated relying party tests.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mockmyid_server::{routes, AppState, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mockmyid_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(Cli::parse());
    tracing::info!(?config, "Loaded configuration");

    let issuer = config.build_issuer()?;
    tracing::info!(
        algorithm = %issuer.authority().algorithm(),
        domain = %issuer.domain(),
        "Loaded authority key"
    );

    let state = Arc::new(AppState::new(issuer, config.security_level));

    // Generate the default subject key before accepting requests
    let key = state.default_key().await?;
    tracing::info!(algorithm = %key.algorithm(), "Default subject key ready");

    let prefix = config.prefix();
    let app = routes::create_router(state, &prefix);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Starting mockmyid server on http://{}{}", addr, prefix);

    axum::serve(listener, app).await?;

    Ok(())
}
