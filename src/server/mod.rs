//! HTTP surface: router wiring, CORS, tracing, and graceful shutdown.

mod handlers;

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::require_bearer_token;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/recipe", post(handlers::create_recipe))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token));

    Router::new()
        .route("/", get(handlers::root))
        .route("/hello/:name", get(handlers::hello))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin("*".parse::<HeaderValue>().expect("valid header value"))
                        .allow_methods([Method::GET, Method::POST]),
                ),
        )
        .with_state(state)
}

pub async fn run(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from_str(&format!("{host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };

    info!("shutdown signal received");
}
