use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, Request, header};
use axum::response::Response;
use migration::{Migrator, MigratorTrait};
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tabletop_api::config::{Config, Environment};
use tabletop_api::sessions::PeerRegistry;
use tabletop_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        google = !config.google_client_id.is_empty(),
        facebook = !config.facebook_client_id.is_empty(),
        max_upload_bytes = config.max_upload_bytes,
        "Starting tabletop API"
    );

    let db = tabletop_api::db::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("Database ready, migrations applied");

    let state = AppState {
        db,
        config: config.clone(),
        peers: PeerRegistry::new(),
    };
    let app = build_app(state, &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");

    Ok(())
}

/// Routes plus CORS and request tracing.
fn build_app(state: AppState, config: &Config) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                status_code = tracing::field::Empty,
            )
        })
        .on_response(|response: &Response, latency: Duration, span: &Span| {
            span.record("status_code", response.status().as_u16());
            tracing::info!(latency_ms = latency.as_millis(), "response");
        })
        .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
            tracing::warn!(%error, latency_ms = latency.as_millis(), "request failed");
        });

    tabletop_api::routes::router(config)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(trace)
}

/// Production only admits the configured frontend; everything else is permissive.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.environment != Environment::Production {
        return CorsLayer::permissive();
    }

    let origin = HeaderValue::from_str(&config.frontend_url).unwrap_or_else(|_| {
        tracing::warn!(frontend_url = %config.frontend_url, "FRONTEND_URL is not a valid origin");
        HeaderValue::from_static("http://localhost:3001")
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Initialize the `tracing` subscriber; `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tabletop_api={log_level},tower_http=info,sea_orm=warn").into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
