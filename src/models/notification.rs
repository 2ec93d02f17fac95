use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationKind;

/// A notification addressed to exactly one recipient.
///
/// After creation only `read` (and its `updated_at` stamp) changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    #[serde(default)]
    pub creator_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Fresh unread notification stamped with the current time.
    pub fn new(recipient_id: Uuid, title: impl Into<String>, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            creator_id: None,
            title: title.into(),
            message: message.into(),
            category: None,
            kind: NotificationKind::default(),
            read: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_creator(mut self, creator_id: Uuid) -> Self {
        self.creator_id = Some(creator_id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_unread(&self) -> bool {
        !self.read
    }
}
