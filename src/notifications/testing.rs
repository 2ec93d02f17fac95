//! In-memory store and feedback doubles for session and shell tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use uuid::Uuid;

use super::feedback::{FeedbackSink, Toast};
use super::store::{NotificationStore, StoreError};
use crate::models::Notification;

pub(crate) fn note(read: bool) -> Notification {
    let mut n = Notification::new(Uuid::new_v4(), "Reminder", "Check your inbox");
    n.read = read;
    n
}

type ScriptedList = (Duration, Result<Vec<Notification>, StoreError>);

#[derive(Default)]
pub(crate) struct FakeStore {
    notifications: Mutex<Vec<Notification>>,
    scripted_lists: Mutex<VecDeque<ScriptedList>>,
    failing_reads: Mutex<HashSet<Uuid>>,
    delete_failure: Mutex<Option<StoreError>>,
    list_fails: AtomicBool,
    list_calls: AtomicUsize,
    mark_read_calls: AtomicUsize,
}

impl FakeStore {
    pub(crate) fn with(notifications: Vec<Notification>) -> Self {
        let store = Self::default();
        store.set(notifications);
        store
    }

    pub(crate) fn set(&self, notifications: Vec<Notification>) {
        *self.notifications.lock().unwrap() = notifications;
    }

    /// Queue a one-off list response delivered after `delay`.
    pub(crate) fn script_list(&self, delay: Duration, response: Result<Vec<Notification>, StoreError>) {
        self.scripted_lists.lock().unwrap().push_back((delay, response));
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.list_fails.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_mark_read(&self, id: Uuid) {
        self.failing_reads.lock().unwrap().insert(id);
    }

    pub(crate) fn fail_delete(&self, error: StoreError) {
        *self.delete_failure.lock().unwrap() = Some(error);
    }

    pub(crate) fn is_read(&self, id: &Uuid) -> bool {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.id == *id && n.read)
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_read_calls(&self) -> usize {
        self.mark_read_calls.load(Ordering::SeqCst)
    }
}

impl NotificationStore for FakeStore {
    async fn list(&self) -> Result<Vec<Notification>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted_lists.lock().unwrap().pop_front();
        if let Some((delay, response)) = scripted {
            tokio::time::sleep(delay).await;
            return response;
        }
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(StoreError::Network("connection refused".into()));
        }
        Ok(self.notifications.lock().unwrap().clone())
    }

    async fn mark_read(&self, id: Uuid) -> Result<(), StoreError> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_reads.lock().unwrap().contains(&id) {
            return Err(StoreError::Network("timeout".into()));
        }
        let mut notifications = self.notifications.lock().unwrap();
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                Ok(())
            }
            None => Err(StoreError::NotFound { message: None }),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        if let Some(error) = self.delete_failure.lock().unwrap().clone() {
            return Err(error);
        }
        let mut notifications = self.notifications.lock().unwrap();
        let before = notifications.len();
        notifications.retain(|n| n.id != id);
        if notifications.len() == before {
            return Err(StoreError::NotFound {
                message: Some("Notification not found".into()),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingFeedback {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingFeedback {
    pub(crate) fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn show(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}
