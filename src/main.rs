use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use search_backend::config::{self, AppConfig};
use search_backend::permission::{AllowAllPermissionClient, HttpPermissionClient, PermissionClient};
use search_backend::search::{InMemorySearchEngine, QueryDispatcher};
use state::AppState;

/// Pick the permission client from config / 根据配置选择权限客户端
///
/// Filtering without a permission service is a startup error.
fn build_permission_client(config: &AppConfig) -> anyhow::Result<Arc<dyn PermissionClient>> {
    match config.permission.base_url.as_deref() {
        Some(base_url) if !base_url.is_empty() => {
            tracing::info!("Permission service: {}", base_url);
            Ok(Arc::new(HttpPermissionClient::new(base_url, config.check_timeout())))
        }
        _ if config.permission.enabled => {
            anyhow::bail!("permission.enabled is true but permission.base_url is not configured")
        }
        _ => Ok(Arc::new(AllowAllPermissionClient)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "search_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    let index = Arc::new(InMemorySearchEngine::new(app_config.search.page_size));
    if let Some(path) = app_config.search.documents_file.as_deref() {
        let count = index.load_documents_file(path).await?;
        tracing::info!("Indexed {} documents from {}", count, path);
    }

    let permissions = build_permission_client(&app_config)?;
    tracing::info!(
        "Permission filtering: {} (max {} concurrent checks)",
        if app_config.permission.enabled { "enabled" } else { "disabled" },
        app_config.max_concurrent_checks()
    );

    let dispatcher = QueryDispatcher::new(
        index.clone(),
        permissions,
        app_config.max_concurrent_checks(),
    );

    let bind_address = app_config.get_bind_address();
    let request_timeout = app_config.request_timeout();
    let state = Arc::new(AppState {
        config: app_config,
        dispatcher,
        index,
    });

    // Timeout drops the in-flight query future, cancelling engine and permission calls
    let app = api::router(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtering_without_service_url_refuses_to_start() {
        let mut config = AppConfig::default();
        config.permission.enabled = true;
        assert!(build_permission_client(&config).is_err());

        config.permission.base_url = Some(String::new());
        assert!(build_permission_client(&config).is_err());
    }

    #[test]
    fn test_permission_client_selection() {
        let mut config = AppConfig::default();
        assert!(build_permission_client(&config).is_ok());

        config.permission.enabled = true;
        config.permission.base_url = Some("http://localhost:7008/api/permission".to_string());
        assert!(build_permission_client(&config).is_ok());
    }
}
