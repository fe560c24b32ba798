// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use encoteki_server::{
    api::router,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    session::SessionStore,
    state::AppState,
    storage::AccountDatabase,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Log a fatal startup error and exit non-zero.
fn fail(message: &str, err: impl std::fmt::Display) -> ! {
    error!(error = %err, "{message}");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    init_tracing(LogFormat::from_env());

    // --- Configuration (SESSION_PASSWORD is mandatory) ---
    let config = AppConfig::from_env().unwrap_or_else(|e| fail("Invalid configuration", e));
    info!(
        host = %config.host,
        port = config.port,
        cookie = %config.session.cookie_name,
        secure_cookie = config.session.secure,
        "Loaded configuration"
    );

    // --- Storage ---
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        fail("Failed to create data directory", e);
    }
    let db_path = config.account_db_path();
    let accounts = AccountDatabase::open(&db_path)
        .unwrap_or_else(|e| fail("Failed to open account database", e));
    info!(path = %db_path.display(), "Account database ready");

    // --- State & router ---
    let sessions = SessionStore::new(config.session.clone())
        .unwrap_or_else(|e| fail("Failed to initialize session sealing", e));
    let state = AppState::new(sessions, Arc::new(accounts));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .unwrap_or_else(|e| fail("Failed to parse bind address", e));

    // --- Graceful shutdown ---
    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
        }
    });

    let served = match &config.tls {
        Some((cert_path, key_path)) => {
            // Install the ring crypto provider for rustls (before any TLS operations)
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                fail("Failed to install rustls crypto provider", "already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .unwrap_or_else(|e| fail("Failed to load TLS certificate", e));

            info!("Encoteki server listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("Encoteki server listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = served {
        fail("Server failed", e);
    }
    info!("Server stopped");
}
