use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::NotificationKind;
use crate::models::Notification;

const ENTITY: &str = "notification";

const SELECT_COLUMNS: &str = "SELECT id, recipient_id, creator_id, title, message, category,
     kind, read, created_at, updated_at
     FROM notifications";

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid timestamp {raw}: {e}")))
}

fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub fn insert_notification(conn: &Connection, notification: &Notification) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, recipient_id, creator_id, title, message, category,
         kind, read, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            notification.id.to_string(),
            notification.recipient_id.to_string(),
            notification.creator_id.map(|id| id.to_string()),
            notification.title,
            notification.message,
            notification.category,
            notification.kind.as_str(),
            notification.read as i32,
            format_timestamp(&notification.created_at),
            format_timestamp(&notification.updated_at),
        ],
    )?;
    Ok(())
}

/// Notifications for one recipient, newest first, at most `limit` rows.
pub fn list_notifications_for_recipient(
    conn: &Connection,
    recipient_id: &Uuid,
    limit: u32,
) -> Result<Vec<Notification>, DatabaseError> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE recipient_id = ?1
         ORDER BY created_at DESC, rowid DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![recipient_id.to_string(), limit], read_row)?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(row_to_notification(row?)?);
    }
    Ok(notifications)
}

pub fn get_notification(conn: &Connection, id: &Uuid) -> Result<Option<Notification>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id.to_string()], read_row)
        .optional()?;
    row.map(row_to_notification).transpose()
}

/// Flip `read` to true. Already-read rows succeed without change.
pub fn mark_notification_read(
    conn: &Connection,
    recipient_id: &Uuid,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let exists: Option<i32> = conn
        .query_row(
            "SELECT read FROM notifications WHERE id = ?1 AND recipient_id = ?2",
            params![id.to_string(), recipient_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match exists {
        None => Err(not_found(id)),
        Some(read) if read != 0 => Ok(()),
        Some(_) => {
            conn.execute(
                "UPDATE notifications SET read = 1, updated_at = ?1
                 WHERE id = ?2 AND recipient_id = ?3",
                params![
                    format_timestamp(&Utc::now()),
                    id.to_string(),
                    recipient_id.to_string(),
                ],
            )?;
            Ok(())
        }
    }
}

pub fn delete_notification(
    conn: &Connection,
    recipient_id: &Uuid,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM notifications WHERE id = ?1 AND recipient_id = ?2",
        params![id.to_string(), recipient_id.to_string()],
    )?;
    if affected == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub fn count_unread(conn: &Connection, recipient_id: &Uuid) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND read = 0",
        params![recipient_id.to_string()],
        |row| row.get::<_, u32>(0),
    )?;
    Ok(count)
}

fn not_found(id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: ENTITY.into(),
        id: id.to_string(),
    }
}

type NotificationRow = (
    String, String, Option<String>, String, String,
    Option<String>, String, i32, String, String,
);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, DatabaseError> {
    let (
        id, recipient_id, creator_id, title, message,
        category, kind, read, created_at, updated_at,
    ) = row;
    Ok(Notification {
        id: parse_uuid(&id)?,
        recipient_id: parse_uuid(&recipient_id)?,
        creator_id: creator_id.and_then(|s| Uuid::parse_str(&s).ok()),
        title,
        message,
        category,
        kind: NotificationKind::from_str(&kind)?,
        read: read != 0,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::Duration;

    fn notification_at(recipient: Uuid, title: &str, minutes_ago: i64) -> Notification {
        let mut n = Notification::new(recipient, title, "body");
        n.created_at = Utc::now() - Duration::minutes(minutes_ago);
        n.updated_at = n.created_at;
        n
    }

    #[test]
    fn insert_and_get_round_trips_fields() {
        let conn = open_memory_database().unwrap();
        let creator = Uuid::new_v4();
        let n = Notification::new(Uuid::new_v4(), "Flu shots", "Clinic open Saturday")
            .with_creator(creator)
            .with_category("vaccination")
            .with_kind(NotificationKind::System);
        insert_notification(&conn, &n).unwrap();

        let loaded = get_notification(&conn, &n.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Flu shots");
        assert_eq!(loaded.creator_id, Some(creator));
        assert_eq!(loaded.category.as_deref(), Some("vaccination"));
        assert_eq!(loaded.kind, NotificationKind::System);
        assert!(!loaded.read);
        assert_eq!(
            loaded.created_at.timestamp_micros(),
            n.created_at.timestamp_micros()
        );
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_notification(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn list_is_newest_first_and_scoped_to_recipient() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        insert_notification(&conn, &notification_at(alice, "old", 30)).unwrap();
        insert_notification(&conn, &notification_at(alice, "new", 1)).unwrap();
        insert_notification(&conn, &notification_at(alice, "mid", 10)).unwrap();
        insert_notification(&conn, &notification_at(bob, "other", 0)).unwrap();

        let titles: Vec<String> = list_notifications_for_recipient(&conn, &alice, 200)
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn list_respects_limit() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        for i in 0..5 {
            insert_notification(&conn, &notification_at(alice, &format!("n{i}"), i)).unwrap();
        }
        let listed = list_notifications_for_recipient(&conn, &alice, 3).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].title, "n0");
    }

    #[test]
    fn mark_read_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        let n = notification_at(alice, "tip", 5);
        insert_notification(&conn, &n).unwrap();

        mark_notification_read(&conn, &alice, &n.id).unwrap();
        let first = get_notification(&conn, &n.id).unwrap().unwrap();
        assert!(first.read);
        assert!(first.updated_at > n.updated_at);

        mark_notification_read(&conn, &alice, &n.id).unwrap();
        let second = get_notification(&conn, &n.id).unwrap().unwrap();
        assert!(second.read);
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[test]
    fn mark_read_of_foreign_notification_is_not_found() {
        let conn = open_memory_database().unwrap();
        let n = notification_at(Uuid::new_v4(), "private", 1);
        insert_notification(&conn, &n).unwrap();

        let result = mark_notification_read(&conn, &Uuid::new_v4(), &n.id);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
        assert!(!get_notification(&conn, &n.id).unwrap().unwrap().read);
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        let n = notification_at(alice, "gone", 1);
        insert_notification(&conn, &n).unwrap();

        delete_notification(&conn, &alice, &n.id).unwrap();
        assert!(get_notification(&conn, &n.id).unwrap().is_none());

        let again = delete_notification(&conn, &alice, &n.id);
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn count_unread_tracks_mark_read() {
        let conn = open_memory_database().unwrap();
        let alice = Uuid::new_v4();
        let a = notification_at(alice, "a", 2);
        let b = notification_at(alice, "b", 1);
        insert_notification(&conn, &a).unwrap();
        insert_notification(&conn, &b).unwrap();
        assert_eq!(count_unread(&conn, &alice).unwrap(), 2);

        mark_notification_read(&conn, &alice, &a.id).unwrap();
        assert_eq!(count_unread(&conn, &alice).unwrap(), 1);
        assert_eq!(count_unread(&conn, &Uuid::new_v4()).unwrap(), 0);
    }

    #[test]
    fn blank_title_violates_check_constraint() {
        let conn = open_memory_database().unwrap();
        let n = Notification::new(Uuid::new_v4(), "   ", "body");
        assert!(insert_notification(&conn, &n).is_err());
    }
}
