use std::sync::Arc;

use feature_flag_service::flags::{FlagRegistry, FlagService};
use feature_flag_service::{config, routes, state};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let service = FlagService::new(Arc::new(FlagRegistry::new()));

    // Seeding is best effort, the service starts with whatever loaded
    if let Some(seed_path) = &config.seed_path {
        match service.load_seed(seed_path) {
            Ok(report) if report.source_found => tracing::info!(
                path = %seed_path.display(),
                loaded = report.loaded,
                rejected = report.rejected.len(),
                "seeded flags"
            ),
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "seed load failed"),
        }
    }

    if service.registry().is_empty() {
        tracing::warn!("starting with no flags");
    } else {
        tracing::info!(flags = service.registry().len(), "flag registry ready");
    }

    let state = state::AppState::new(service);

    let app = routes::routes().with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    tracing::info!(addr = %config.addr(), "feature flag service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received");
}
