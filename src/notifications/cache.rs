use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::Notification;

/// Ordered, de-duplicated projection of the recipient's notifications.
///
/// Order is the store's order (newest first). Entries only ever move
/// Unread → Read or disappear; nothing turns a read entry unread.
#[derive(Debug, Default, Clone)]
pub struct NotificationCache {
    entries: Vec<Notification>,
}

/// Read-only view published to the presentation layer after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheSnapshot {
    pub entries: Vec<Notification>,
    pub unread_count: usize,
    pub badge: Option<String>,
}

impl NotificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with `fetched`. Later duplicates of an id
    /// are dropped; no state from the previous contents survives.
    pub fn replace_all(&mut self, fetched: Vec<Notification>) {
        let mut seen = HashSet::with_capacity(fetched.len());
        self.entries = fetched
            .into_iter()
            .filter(|n| seen.insert(n.id))
            .collect();
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == *id)
    }

    /// Returns true when the entry existed and was unread.
    pub fn mark_read(&mut self, id: &Uuid) -> bool {
        match self.entries.iter_mut().find(|n| n.id == *id) {
            Some(entry) if !entry.read => {
                entry.read = true;
                true
            }
            _ => false,
        }
    }

    /// Mark every listed id read. Returns how many entries changed.
    pub fn mark_read_many(&mut self, ids: &[Uuid]) -> usize {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|n| wanted.contains(&n.id)) {
            if !entry.read {
                entry.read = true;
                changed += 1;
            }
        }
        changed
    }

    /// Remove an entry. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &Uuid) -> Option<Notification> {
        let index = self.entries.iter().position(|n| n.id == *id)?;
        Some(self.entries.remove(index))
    }

    pub fn unread_ids(&self) -> Vec<Uuid> {
        self.entries
            .iter()
            .filter(|n| n.is_unread())
            .map(|n| n.id)
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| n.is_unread()).count()
    }

    /// Leading entries for the dropdown.
    pub fn preview(&self, len: usize) -> &[Notification] {
        &self.entries[..len.min(self.entries.len())]
    }

    pub fn snapshot(&self, badge_cap: usize) -> CacheSnapshot {
        let unread_count = self.unread_count();
        CacheSnapshot {
            entries: self.entries.clone(),
            unread_count,
            badge: badge_label(unread_count, badge_cap),
        }
    }
}

/// Badge text for an unread count: hidden at zero, "9+" above the cap.
pub fn badge_label(unread: usize, cap: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > cap => Some(format!("{cap}+")),
        n => Some(n.to_string()),
    }
}
