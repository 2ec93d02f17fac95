//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_secs: u64,
    pub version: &'static str,
}

/// `GET /api/health`: connection check, no identity required.
pub async fn check(
    State(ctx): State<ApiContext>,
) -> Result<Json<HealthResponse>, ApiError> {
    let database = ctx
        .core
        .with_db(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(Into::into)
        })
        .is_ok();

    Ok(Json(HealthResponse {
        status: "ok",
        database,
        uptime_secs: ctx.core.uptime_secs(),
        version: crate::config::APP_VERSION,
    }))
}
