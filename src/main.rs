// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment Gate Service
//!
//! Decision service called by the article platform before it writes a
//! comment or a like. The caller resolves the session and database facts,
//! posts them here with the client token, and applies the returned intent.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `COMMENT_RATE_LIMIT`: Comments per window per client (default: 10)
//! - `LIKE_RATE_LIMIT`: Likes per window per client (default: 60)
//! - `RATE_WINDOW_MS`: Window length in milliseconds (default: 60000)
//! - `RATE_TRACKED_TOKENS`: Clients tracked before pruning (default: 500)
//! - `NEW_USER_THRESHOLD`: Prior comments before auto-approval (default: 3)
//! - `MAX_COMMENT_CHARS`: Maximum comment length (default: 2000)
//! - `METRICS_ENABLED`: Expose `/metrics` (default: true)
//!
//! Limits are enforced per process. Running several replicas multiplies the
//! effective budget by the replica count.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use comment_gate::{
    config::Config,
    error::AppError,
    gate::CommentGate,
    handlers::{router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        comment_limit = config.comment_limiter.limit,
        like_limit = config.like_limiter.limit,
        window_ms = config.comment_limiter.interval_ms,
        new_user_threshold = config.moderation.new_user_threshold,
        "Starting comment gate"
    );

    let gate = CommentGate::new(&config)?;
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|_| AppError::InvalidBindAddr(config.bind_addr.clone()))?;

    let app = router(Arc::new(AppState { gate, config }));

    let listener = TcpListener::bind(addr).await.map_err(AppError::from)?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
