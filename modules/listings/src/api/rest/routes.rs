use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};

use super::handlers;
use crate::domain::service::ListingService;

/// Admin payloads may carry inline images, so the body cap is well above
/// the framework default.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Public listing, admin console and liveness routes.
pub fn router(service: Arc<ListingService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/{kind}", get(handlers::list_public))
        .route("/api/{kind}/search", post(handlers::search_public))
        .route(
            "/api/admin/{kind}",
            get(handlers::list_admin).post(handlers::create_listing),
        )
        .route(
            "/api/admin/{kind}/{id}",
            get(handlers::get_listing).put(handlers::update_listing),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(service))
}
