//! Team Roster Backend
//!
//! Serves member list, detail, form and contact data from a single JSON
//! document, with portfolio attachments stored on disk.

mod api;
mod config;
mod errors;
mod models;
mod service;
mod store;
mod uploads;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use service::MemberService;
use store::RecordStore;
use uploads::UploadStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub members: Arc<MemberService>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting Team Roster Backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    let members = Arc::new(MemberService::new(
        RecordStore::new(&config.data_path),
        UploadStore::new(&config.upload_dir),
    ));
    tracing::info!("Member document: {:?}", members.store().path());
    tracing::info!("Upload directory: {:?}", members.uploads().dir());

    // Give legacy records a canonical id before serving
    let assigned = members.migrate_identities()?;
    if assigned > 0 {
        tracing::info!("Migrated {} member records to generated ids", assigned);
    }
    tracing::info!("Loaded {} members", members.list().len());

    // Create application state
    let state = AppState {
        members,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let page_routes = Router::new()
        .route("/", get(api::list_members))
        .route("/result", get(api::list_members))
        .route("/result/{id}", get(api::get_member))
        .route("/member", get(api::member_redirect))
        .route("/input", get(api::input_form).post(api::submit_member))
        .route("/member/update", post(api::update_member))
        .route("/contact", get(api::list_contacts))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    // Stored attachments, addressed by the bare name in `portfolio_file`
    let upload_files = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .merge(page_routes)
        .nest_service("/uploads", upload_files)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
