//! Notification API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Cache-Control: no-store → 2. Recipient identity → 3. Audit logger

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the notification API router.
pub fn notification_api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/notifications",
            get(endpoints::notifications::list).post(endpoints::notifications::create),
        )
        .route(
            "/notifications/unread-count",
            get(endpoints::notifications::unread_count),
        )
        .route(
            "/notifications/:id/read",
            patch(endpoints::notifications::mark_read),
        )
        .route(
            "/notifications/:id",
            delete(endpoints::notifications::delete),
        )
        .with_state(ctx.clone())
        // Innermost first, outermost last
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_recipient))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    // The SPA is served from a different origin than the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .nest("/api", protected.merge(unprotected))
        .layer(cors)
}
