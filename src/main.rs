use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use screening_backend::{config::Config, routes, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;
    let addr: SocketAddr = config.server_address.parse()?;

    let app_state = AppState::new(config);

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/applications",
            post(routes::application_routes::submit_application),
        )
        .route(
            "/api/applications/:id",
            get(routes::application_routes::get_application),
        )
        .route(
            "/api/interview/confirm/:token",
            post(routes::interview::confirm_interview),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
