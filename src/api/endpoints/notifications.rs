//! Notification endpoints.
//!
//! - `GET    /api/notifications`              caller's notifications, newest first
//! - `POST   /api/notifications`              create one for any recipient
//! - `GET    /api/notifications/unread-count` caller's unread total
//! - `PATCH  /api/notifications/:id/read`     mark one as read (idempotent)
//! - `DELETE /api/notifications/:id`          delete one permanently

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, RecipientContext};
use crate::db;
use crate::models::enums::NotificationKind;
use crate::models::Notification;

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub recipient_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub kind: Option<NotificationKind>,
}

impl CreateNotificationRequest {
    /// Validate and build the record. Health tips are attributed to the
    /// caller; system notifications carry no creator.
    fn into_notification(self, caller: Uuid) -> Result<Notification, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("Title is required".into()));
        }
        let message = self.message.trim();
        if message.is_empty() {
            return Err(ApiError::Validation("Message is required".into()));
        }

        let kind = self.kind.unwrap_or_default();
        let mut notification = Notification::new(self.recipient_id, title, message).with_kind(kind);
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            notification = notification.with_category(category);
        }
        if kind == NotificationKind::HealthTip {
            notification = notification.with_creator(caller);
        }
        Ok(notification)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: u32,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid notification ID format".into()))
}

/// `GET /api/notifications`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(recipient): Extension<RecipientContext>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let limit = ctx.core.list_limit;
    let notifications = ctx.core.with_db(|conn| {
        db::list_notifications_for_recipient(conn, &recipient.recipient_id, limit)
    })?;
    Ok(Json(notifications))
}

/// `POST /api/notifications`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<RecipientContext>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let notification = request.into_notification(caller.recipient_id)?;
    ctx.core
        .with_db(|conn| db::insert_notification(conn, &notification))?;

    tracing::info!(
        id = %notification.id,
        recipient = %notification.recipient_id,
        kind = %notification.kind,
        "Notification created"
    );
    Ok((StatusCode::CREATED, Json(notification)))
}

/// `GET /api/notifications/unread-count`
pub async fn unread_count(
    State(ctx): State<ApiContext>,
    Extension(recipient): Extension<RecipientContext>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = ctx
        .core
        .with_db(|conn| db::count_unread(conn, &recipient.recipient_id))?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// `PATCH /api/notifications/:id/read`
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(recipient): Extension<RecipientContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    ctx.core
        .with_db(|conn| db::mark_notification_read(conn, &recipient.recipient_id, &id))?;
    Ok(Json(MessageResponse {
        message: "Notification marked as read",
    }))
}

/// `DELETE /api/notifications/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(recipient): Extension<RecipientContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    ctx.core
        .with_db(|conn| db::delete_notification(conn, &recipient.recipient_id, &id))?;

    tracing::info!(%id, recipient = %recipient.recipient_id, "Notification deleted");
    Ok(Json(MessageResponse {
        message: "Notification deleted",
    }))
}
