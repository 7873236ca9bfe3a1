//! Balloon Fiesta Storefront - Public balloon shop.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - Catalog read from a `web.json` document (file or URL), cached in memory
//! - Carts, logins and notices in in-memory sessions
//! - Orders, accounts and wholesale requests in the in-process shop store

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use balloon_fiesta_storefront::config::StorefrontConfig;
use balloon_fiesta_storefront::create_router;
use balloon_fiesta_storefront::state::{AppState, SystemClock};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start Sentry when a DSN is configured. The guard flushes on drop.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// Warn and error become Sentry events; info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    use tracing::Level;

    let level = *metadata.level();
    if level <= Level::WARN {
        sentry_tracing::EventFilter::Event
    } else if level <= Level::DEBUG {
        sentry_tracing::EventFilter::Breadcrumb
    } else {
        sentry_tracing::EventFilter::Ignore
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter and
/// `BF_LOG_JSON` switches the output to one JSON object per line.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "balloon_fiesta_storefront=info,tower_http=debug".into());

    let json_logs = std::env::var_os("BF_LOG_JSON").is_some();
    let json_layer = json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Fill the catalog cache before the first request. A failure here is not
/// fatal: pages load the catalog again on demand.
async fn warm_catalog(state: &AppState) {
    let catalog = state.catalog();
    match catalog.try_load().await {
        Ok(loaded) => tracing::info!(
            source = %catalog.source(),
            products = loaded.products().len(),
            "Catalog loaded"
        ),
        Err(e) => tracing::warn!(source = %catalog.source(), error = %e, "Catalog not loaded at startup"),
    }
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry first, so the tracing layer has a client to report to
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let accounts = config
        .load_accounts()
        .expect("Failed to load predefined accounts");
    tracing::info!(count = accounts.len(), "Predefined accounts loaded");

    let state = AppState::new(config.clone(), accounts, Arc::new(SystemClock));
    warm_catalog(&state).await;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Balloon Fiesta storefront listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.expect("Failed to install Ctrl+C handler"),
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");

    tracing::info!("Shutting down");
}
