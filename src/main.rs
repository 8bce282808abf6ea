// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, time::Duration};

use axum_server::tls_rustls::RustlsConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bizdesk_session::{
    api::{cors_layer, router},
    auth::{password::hash_password, Role},
    config::{AppConfig, LOG_FORMAT_ENV},
    state::{AppState, AuthConfig},
    store::InMemoryStore,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            process::exit(1);
        }
    };

    let mut store = InMemoryStore::new();

    if let Some(seed) = &config.seed_superadmin {
        let created = hash_password(&seed.password)
            .map_err(|e| e.to_string())
            .and_then(|hash| {
                store
                    .create_user(&seed.email, None, hash, Role::SuperAdmin)
                    .map_err(|e| e.to_string())
            });
        match created {
            Ok(user) => tracing::info!(user_id = %user.id, email = %user.email, "Seeded superadmin account"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to seed superadmin account");
                process::exit(1);
            }
        }
    }

    if store.is_empty() {
        tracing::info!("No accounts yet; set SEED_SUPERADMIN_EMAIL and SEED_SUPERADMIN_PASSWORD to bootstrap an administrator");
    }

    let state = AppState::new(AuthConfig::from_config(&config), store);
    let mut app = router(state);
    if let Some(cors) = cors_layer(&config.cors_allowed_origins) {
        app = app.layer(cors);
    }

    let addr = config.bind_addr;

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining connections");
            handle.graceful_shutdown(Some(Duration::from_secs(10)));
        }
    });

    if !config.secure_cookies() {
        tracing::warn!("Development mode: session cookies are sent without the Secure flag");
    }

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .expect("Failed to load TLS certificate and key");

            tracing::info!(%addr, "Bizdesk session server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            tracing::info!(%addr, "Bizdesk session server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }
}
