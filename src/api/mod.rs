pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put, delete},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    domain::MAX_DOCUMENT_SIZE,
    service::ServiceContext,
};
use state::AppState;

/// Four documents plus the text fields.
const REGISTRATION_BODY_LIMIT: usize = 4 * MAX_DOCUMENT_SIZE + 1024 * 1024;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let storage_path = format!("/storage/{}", settings.storage.bucket);
    let bucket_dir = settings.bucket_dir();
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))

        // Uploaded documents, published under their public URLs
        .nest_service(&storage_path, ServeDir::new(bucket_dir))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/activities", get(handlers::activities::list))
        .route(
            "/registrations",
            post(handlers::registrations::create)
                .layer(DefaultBodyLimit::max(REGISTRATION_BODY_LIMIT)),
        )
        // Member records carry guardian identity and phone numbers
        .nest("/members", member_routes().layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin::require_admin,
        )))
        .route("/statistics", get(handlers::statistics::get))
        .route("/statistics/export", get(handlers::statistics::export))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::members::list))
        .route("/export", get(handlers::members::export))
        .route("/print", post(handlers::members::print))
        .route("/by-member-id/:member_id", get(handlers::members::get_by_member_id))
        .route("/:id", get(handlers::members::get))
        .route("/:id/receipts/:kind", get(handlers::members::receipt))
        .route("/:id/bundle", get(handlers::members::bundle))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/settings", get(handlers::settings::get_settings))
        .route("/settings/reset-member-counter", post(handlers::settings::reset_member_counter))
        .route("/settings/card-range", put(handlers::settings::update_card_range))
        .route("/settings/season", put(handlers::settings::update_season))
        .route("/settings/:key", put(handlers::settings::update_setting))
        .route("/members", delete(handlers::settings::delete_all_members))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin::require_admin,
        ))
}
