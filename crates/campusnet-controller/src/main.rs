//! campusnet controller
//!
//! - Admin API: /v1/identities, /v1/servers, /v1/groups, /v1/connections, ...
//! - Topology / flow authority: Floodlight-compatible REST
//! - Graceful shutdown: readiness flips to draining, live connections are
//!   torn down before exit

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use campusnet_controller::{app_state::AppState, config, inventory, router};

const DEFAULT_CONFIG_PATH: &str = "campusnet.yaml";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "campusnet-controller exited with error");
        std::process::exit(1);
    }
}

async fn run() -> campusnet_core::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.controller.listen.parse().map_err(|e| {
        campusnet_core::CampusNetError::BadRequest(format!("controller.listen: {e}"))
    })?;
    let seed = cfg.controller.inventory.clone();

    let state = AppState::new(cfg)?;

    if let Some(seed) = seed {
        match inventory::load_from_file(&seed).and_then(|doc| state.import_inventory(doc)) {
            Ok(s) => tracing::info!(
                path = %seed,
                identities = s.identities,
                servers = s.servers,
                groups = s.groups,
                "inventory seeded"
            ),
            Err(e) => tracing::warn!(path = %seed, error = %e, "inventory seed skipped"),
        }
    }

    let app = router::build_router(state.clone());

    tracing::info!(%listen, topology = %state.cfg().topology.base_url, "campusnet-controller starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| campusnet_core::CampusNetError::Internal(format!("bind {listen}: {e}")))?;

    let drain_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            drain_state.metrics().set_draining();
        })
        .await
        .map_err(|e| campusnet_core::CampusNetError::Internal(format!("server failed: {e}")))?;

    let removed = state.teardown_all().await;
    tracing::info!(removed, "connections torn down; bye");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, draining");
}
