pub mod response;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::utils::error::{AppError, Result};
use routes::{assistant, favorites, forecast, listings, tasks, users, viewed};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/listings", post(listings::create_listing))
        .route(
            "/listings/{id}",
            get(listings::get_listing).delete(listings::delete_listing),
        )
        .route("/search", get(listings::search))
        .route(
            "/favorites",
            post(favorites::add_favorite).get(favorites::list_favorites),
        )
        .route("/favorites/{id}", delete(favorites::delete_favorite))
        .route(
            "/recently-viewed",
            post(viewed::log_view).get(viewed::list_views),
        )
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks/generate", post(tasks::generate_tasks))
        .route("/tasks/{id}", delete(tasks::delete_task))
        .route("/chat", post(assistant::chat))
        .route("/mortgage", post(assistant::mortgage))
        .route("/forecast", post(forecast::forecast_price))
        .route("/forecast/favorites", get(forecast::forecast_favorites));

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api)
        .layer(cors_layer(&state.config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(allowed)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let address = state.config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    serve_on(listener, state).await
}

pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    let address = listener.local_addr()?;
    tracing::info!("🚀 Server running on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::IoError)?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install signal handler: {}", e);
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
