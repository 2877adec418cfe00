pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::ProductService;
use crate::storage::ImageStore;

/// Shared application state threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub products: Arc<ProductService>,
    pub images: Arc<dyn ImageStore>,
}

/// Build the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    // Leave headroom above the image limit for the other multipart fields.
    let body_limit = state.config.max_upload_bytes as usize + 64 * 1024;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/product", handlers::products::product_routes())
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
