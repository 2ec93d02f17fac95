//! Role shell: the patient, doctor and student containers.
//!
//! Every role shares the same notification session and poll timer; only
//! the navigation items differ.

use std::sync::Arc;

use serde::Serialize;

use super::feedback::FeedbackSink;
use super::poller::PollHandle;
use super::session::{NotificationSession, RefreshOutcome};
use super::store::NotificationStore;
use crate::config::CacheConfig;
use crate::models::enums::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn item(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const PATIENT_NAV: &[NavItem] = &[
    item("Dashboard", "/patient/dashboard"),
    item("Appointments", "/patient/appointments"),
    item("Prescriptions", "/patient/prescriptions"),
    item("Medical Records", "/patient/records"),
    item("Chat", "/patient/chat"),
    item("Notifications", "/patient/notifications"),
];

const DOCTOR_NAV: &[NavItem] = &[
    item("Dashboard", "/doctor/dashboard"),
    item("Patients", "/doctor/patients"),
    item("Appointments", "/doctor/appointments"),
    item("Prescriptions", "/doctor/prescriptions"),
    item("Chat", "/doctor/chat"),
    item("Notifications", "/doctor/notifications"),
];

const STUDENT_NAV: &[NavItem] = &[
    item("Dashboard", "/student/dashboard"),
    item("Health Tips", "/student/health-tips"),
    item("Medical Records", "/student/records"),
    item("Chat", "/student/chat"),
    item("Notifications", "/student/notifications"),
];

pub fn nav_items(role: Role) -> &'static [NavItem] {
    match role {
        Role::Patient => PATIENT_NAV,
        Role::Doctor => DOCTOR_NAV,
        Role::Student => STUDENT_NAV,
    }
}

/// A mounted role shell. Owns exactly one poll timer, cancelled on
/// `unmount` or drop.
pub struct RoleShell<S: NotificationStore> {
    role: Role,
    session: NotificationSession<S>,
    poll: Option<PollHandle>,
}

impl<S: NotificationStore> RoleShell<S> {
    /// Refresh once, then start polling at `config.poll_interval`.
    pub async fn mount(
        role: Role,
        store: Arc<S>,
        config: CacheConfig,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        let period = config.poll_interval;
        let session = NotificationSession::new(store, feedback, config);

        if let RefreshOutcome::Failed(e) = session.refresh().await {
            tracing::warn!(%role, error = %e, "Initial notification load failed");
        }
        let poll = PollHandle::spawn(session.clone(), period);

        tracing::info!(%role, unread = session.unread_count(), "Role shell mounted");
        Self {
            role,
            session,
            poll: Some(poll),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn nav_items(&self) -> &'static [NavItem] {
        nav_items(self.role)
    }

    pub fn notifications(&self) -> &NotificationSession<S> {
        &self.session
    }

    pub fn is_mounted(&self) -> bool {
        self.poll.is_some()
    }

    /// Cancel the poll timer and close the session.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.cancel();
            self.session.close();
            tracing::info!(role = %self.role, "Role shell unmounted");
        }
    }
}

impl<S: NotificationStore> Drop for RoleShell<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time;

    use crate::notifications::testing::{note, FakeStore, RecordingFeedback};

    const PERIOD: Duration = Duration::from_secs(30);

    async fn mount(role: Role, store: Arc<FakeStore>) -> RoleShell<FakeStore> {
        RoleShell::mount(
            role,
            store,
            CacheConfig::default(),
            Arc::new(RecordingFeedback::default()),
        )
        .await
    }

    #[test]
    fn every_role_has_notifications_entry() {
        for role in [Role::Patient, Role::Doctor, Role::Student] {
            let items = nav_items(role);
            assert!(items.iter().any(|i| i.label == "Notifications"));
            let prefix = format!("/{}/", role.as_str());
            assert!(items.iter().all(|i| i.path.starts_with(&prefix)));
        }
    }

    #[test]
    fn roles_differ_only_in_navigation() {
        assert!(nav_items(Role::Doctor).iter().any(|i| i.label == "Patients"));
        assert!(!nav_items(Role::Patient).iter().any(|i| i.label == "Patients"));
        assert!(nav_items(Role::Student).iter().any(|i| i.label == "Health Tips"));
    }

    #[tokio::test(start_paused = true)]
    async fn mount_loads_immediately_then_polls() {
        let store = Arc::new(FakeStore::with(vec![note(false), note(true)]));
        let shell = mount(Role::Patient, store.clone()).await;

        assert_eq!(store.list_calls(), 1);
        assert_eq!(shell.notifications().unread_count(), 1);
        assert!(shell.is_mounted());

        time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn all_roles_poll_on_the_same_interval() {
        for role in [Role::Patient, Role::Doctor, Role::Student] {
            let store = Arc::new(FakeStore::with(Vec::new()));
            let _shell = mount(role, store.clone()).await;
            time::sleep(PERIOD * 2 + Duration::from_secs(1)).await;
            assert_eq!(store.list_calls(), 3, "{role} should poll every 30s");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn remount_leaves_a_single_active_timer() {
        let store = Arc::new(FakeStore::with(Vec::new()));

        let first = mount(Role::Doctor, store.clone()).await;
        first.unmount();
        let _second = mount(Role::Doctor, store.clone()).await;
        assert_eq!(store.list_calls(), 2);

        time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(store.list_calls(), 3, "only the second shell polls");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_shell_cancels_polling_and_closes_session() {
        let store = Arc::new(FakeStore::with(vec![note(false)]));
        let shell = mount(Role::Student, store.clone()).await;
        let session = shell.notifications().clone();

        drop(shell);
        assert!(session.is_closed());

        time::sleep(PERIOD * 3).await;
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_after_unmount_is_ignored() {
        let store = Arc::new(FakeStore::with(Vec::new()));
        let shell = mount(Role::Patient, store.clone()).await;
        let session = shell.notifications().clone();

        store.script_list(Duration::from_secs(5), Ok(vec![note(false)]));
        let in_flight = tokio::spawn({
            let session = session.clone();
            async move { session.refresh().await }
        });
        time::sleep(Duration::from_secs(1)).await;

        shell.unmount();
        let outcome = in_flight.await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Discarded);
        assert!(session.entries().is_empty());
    }

    #[tokio::test]
    async fn failed_initial_load_still_mounts() {
        let store = Arc::new(FakeStore::default());
        store.fail_list(true);
        let shell = mount(Role::Doctor, store).await;
        assert!(shell.is_mounted());
        assert!(shell.notifications().entries().is_empty());
    }
}
