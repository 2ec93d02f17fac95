//! Per-session notification cache bound to one store.
//!
//! All mutations go through `NotificationSession`. The cache mutex is only
//! held for synchronous updates, never across a store call. After `close()`
//! any response still in flight is discarded instead of touching the cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::join_all;
use tokio::sync::watch;
use uuid::Uuid;

use super::cache::{CacheSnapshot, NotificationCache};
use super::feedback::{FeedbackSink, Toast};
use super::store::{NotificationStore, StoreError};
use crate::config::{CacheConfig, MarkAllPolicy};
use crate::models::Notification;

const GENERIC_READ_ERROR: &str = "Failed to mark notification as read";
const GENERIC_DELETE_ERROR: &str = "Failed to delete notification";

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Cache replaced with `count` entries.
    Applied { count: usize },
    /// A newer refresh already landed, or the session was closed.
    Discarded,
    /// Store call failed; previous cache retained.
    Failed(StoreError),
}

/// Per-item results of a bulk mark-all-as-read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkAllReport {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<(Uuid, StoreError)>,
}

impl MarkAllReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// A store-confirmed change a stale list response must not undo.
#[derive(Debug, Clone, Copy)]
enum Confirmed {
    Read(Uuid),
    Deleted(Uuid),
}

struct CacheState {
    cache: NotificationCache,
    /// Sequence number of the refresh whose result is in `cache`.
    applied_refresh: u64,
    /// Last sequence number handed out.
    issued_refresh: u64,
    /// Bumped on every confirmed mutation.
    mutation_epoch: u64,
    /// Confirmed mutations tagged with their epoch, oldest first.
    confirmed: Vec<(u64, Confirmed)>,
}

impl CacheState {
    fn record(&mut self, change: Confirmed) {
        self.mutation_epoch += 1;
        self.confirmed.push((self.mutation_epoch, change));
    }

    /// Replace the cache with a list fetched under `epoch`, then re-apply
    /// every mutation confirmed after that list was requested.
    fn apply_fetched(&mut self, fetched: Vec<Notification>, epoch: u64) {
        self.cache.replace_all(fetched);
        for (_, change) in self.confirmed.iter().filter(|(e, _)| *e > epoch) {
            match change {
                Confirmed::Read(id) => {
                    self.cache.mark_read(id);
                }
                Confirmed::Deleted(id) => {
                    self.cache.remove(id);
                }
            }
        }
        // Refreshes issued before this one are discarded on arrival; later
        // ones started at an epoch >= `epoch`.
        self.confirmed.retain(|(e, _)| *e > epoch);
    }
}

struct Inner<S> {
    store: Arc<S>,
    feedback: Arc<dyn FeedbackSink>,
    config: CacheConfig,
    state: Mutex<CacheState>,
    snapshots: watch::Sender<CacheSnapshot>,
    closed: AtomicBool,
}

pub struct NotificationSession<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for NotificationSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: NotificationStore> NotificationSession<S> {
    pub fn new(store: Arc<S>, feedback: Arc<dyn FeedbackSink>, config: CacheConfig) -> Self {
        let (snapshots, _) = watch::channel(CacheSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                store,
                feedback,
                config,
                state: Mutex::new(CacheState {
                    cache: NotificationCache::new(),
                    applied_refresh: 0,
                    issued_refresh: 0,
                    mutation_epoch: 0,
                    confirmed: Vec::new(),
                }),
                snapshots,
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // ── Reads ───────────────────────────────────────────────

    pub fn entries(&self) -> Vec<Notification> {
        self.state().cache.entries().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.state().cache.unread_count()
    }

    /// Leading entries for the dropdown (`preview_len`, 5 by default).
    pub fn preview(&self) -> Vec<Notification> {
        self.state().cache.preview(self.inner.config.preview_len).to_vec()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.state().cache.snapshot(self.inner.config.badge_cap)
    }

    /// Receiver that observes a fresh snapshot after every cache change.
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.inner.snapshots.subscribe()
    }

    // ── Lifecycle ───────────────────────────────────────────

    /// Stop accepting store responses. Idempotent.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Notification session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    // ── Operations ──────────────────────────────────────────

    /// Fetch the full list and replace the cache with it.
    ///
    /// Reads and deletes the store confirmed while the request was in
    /// flight are re-applied on top of the fetched list.
    ///
    /// Failures keep the previous cache and are only logged.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (seq, epoch) = {
            let mut state = self.state();
            state.issued_refresh += 1;
            (state.issued_refresh, state.mutation_epoch)
        };

        let result = self.inner.store.list().await;

        if self.is_closed() {
            tracing::debug!(seq, "Refresh response after close, discarded");
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(fetched) => {
                let count = {
                    let mut state = self.state();
                    if seq < state.applied_refresh {
                        tracing::debug!(
                            seq,
                            applied = state.applied_refresh,
                            "Out-of-order refresh discarded"
                        );
                        return RefreshOutcome::Discarded;
                    }
                    state.applied_refresh = seq;
                    state.apply_fetched(fetched, epoch);
                    self.publish(&state);
                    state.cache.len()
                };
                RefreshOutcome::Applied { count }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notification refresh failed, keeping cached list");
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Mark one notification read once the store confirms it.
    pub async fn mark_read(&self, id: Uuid) -> Result<(), StoreError> {
        match self.inner.store.mark_read(id).await {
            Ok(()) => {
                if self.is_closed() {
                    return Ok(());
                }
                let mut state = self.state();
                state.record(Confirmed::Read(id));
                if state.cache.mark_read(&id) {
                    self.publish(&state);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "Mark-read failed");
                if !self.is_closed() {
                    let text = e.user_message().unwrap_or(GENERIC_READ_ERROR).to_string();
                    self.inner.feedback.show(Toast::error(text));
                }
                Err(e)
            }
        }
    }

    /// Mark every unread entry read, issuing the store calls concurrently.
    ///
    /// Under `KeepOptimistic` the entries flip before the calls settle and
    /// stay read whatever the outcome. Under `ConfirmedOnly` only entries
    /// whose own call succeeded flip. Failures are surfaced either way.
    pub async fn mark_all_read(&self) -> MarkAllReport {
        let policy = self.inner.config.mark_all_policy;

        let ids = {
            let mut state = self.state();
            let ids = state.cache.unread_ids();
            if policy == MarkAllPolicy::KeepOptimistic {
                for id in &ids {
                    state.record(Confirmed::Read(*id));
                }
                if state.cache.mark_read_many(&ids) > 0 {
                    self.publish(&state);
                }
            }
            ids
        };

        if ids.is_empty() {
            return MarkAllReport::default();
        }

        let store = &self.inner.store;
        let results = join_all(ids.iter().map(|id| store.mark_read(*id))).await;

        let mut report = MarkAllReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "Bulk mark-read failed for entry");
                    report.failed.push((id, e));
                }
            }
        }

        if self.is_closed() {
            return report;
        }

        if policy == MarkAllPolicy::ConfirmedOnly {
            let mut state = self.state();
            for id in &report.succeeded {
                state.record(Confirmed::Read(*id));
            }
            if state.cache.mark_read_many(&report.succeeded) > 0 {
                self.publish(&state);
            }
        }

        if report.all_succeeded() {
            self.inner
                .feedback
                .show(Toast::success("All notifications marked as read"));
        } else {
            self.inner.feedback.show(Toast::error(format!(
                "Failed to mark {} of {} notifications as read",
                report.failed.len(),
                report.attempted()
            )));
        }

        report
    }

    /// Delete one notification. A store-side `NotFound` counts as success.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        match self.inner.store.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, "Delete of already-removed notification");
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "Delete failed");
                if !self.is_closed() {
                    let text = e.user_message().unwrap_or(GENERIC_DELETE_ERROR).to_string();
                    self.inner.feedback.show(Toast::error(text));
                }
                return Err(e);
            }
        }

        if self.is_closed() {
            return Ok(());
        }

        {
            let mut state = self.state();
            state.record(Confirmed::Deleted(id));
            if state.cache.remove(&id).is_some() {
                self.publish(&state);
            }
        }
        self.inner.feedback.show(Toast::success("Notification deleted"));
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // Poison is ignored: the next refresh replaces the cache wholesale.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &CacheState) {
        self.inner
            .snapshots
            .send_replace(state.cache.snapshot(self.inner.config.badge_cap));
    }
}
