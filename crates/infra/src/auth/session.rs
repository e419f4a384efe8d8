//! Shared session state
//!
//! One [`SessionContext`] exists per authenticated handle. The authenticator
//! and the background routines write to it; resource clients read the token
//! from it on every call through [`AccessTokenProvider`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use datastack_domain::{
    impl_wire_name_conversions, Credentials, DataStackError, Result, SessionSnapshot, UserDetails,
};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::AccessTokenProvider;

/// Background routines a session may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Heartbeat,
    Refresh,
}

impl_wire_name_conversions!(RoutineKind {
    Heartbeat => "heartbeat",
    Refresh => "refresh",
});

/// Handle of one running routine instance
pub(crate) struct RoutineHandle {
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

impl RoutineHandle {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

/// Session state shared by the authenticator, routines and resource clients
pub struct SessionContext {
    credentials: Credentials,
    state: RwLock<SessionSnapshot>,
    heartbeat: Mutex<Option<RoutineHandle>>,
    refresh: Mutex<Option<RoutineHandle>>,
    generations: AtomicU64,
    // Bumped only while `state` is write-locked
    logouts: AtomicU64,
}

impl SessionContext {
    /// Empty session for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: RwLock::new(SessionSnapshot::empty()),
            heartbeat: Mutex::new(None),
            refresh: Mutex::new(None),
            generations: AtomicU64::new(0),
            logouts: AtomicU64::new(0),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Copy of the current session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    /// Most recently committed access token, if any.
    pub async fn current_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn default_timezone(&self) -> String {
        self.state.read().await.default_timezone.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// `true` while a routine of this kind is scheduled.
    pub async fn is_routine_active(&self, kind: RoutineKind) -> bool {
        self.slot(kind).lock().await.as_ref().is_some_and(RoutineHandle::is_live)
    }

    /// Number of logouts so far.
    ///
    /// A login or routine tick reads this before going to the network and
    /// commits its result only while it is unchanged.
    pub(crate) fn logout_epoch(&self) -> u64 {
        self.logouts.load(Ordering::SeqCst)
    }

    /// Overwrite the session with a login/check result.
    ///
    /// Returns `false` without writing when a logout happened after `epoch`
    /// was read.
    pub(crate) async fn replace_if_current(&self, snapshot: SessionSnapshot, epoch: u64) -> bool {
        let mut state = self.state.write().await;
        if self.logout_epoch() != epoch {
            return false;
        }
        *state = snapshot;
        true
    }

    /// Apply a heartbeat/refresh response.
    ///
    /// Skipped when the routine was cancelled or the session logged out
    /// while the request was in flight.
    pub(crate) async fn merge_if_current(
        &self,
        details: &UserDetails,
        epoch: u64,
        cancel: &CancellationToken,
    ) -> bool {
        let mut state = self.state.write().await;
        if cancel.is_cancelled() || self.logout_epoch() != epoch {
            return false;
        }
        state.merge(details);
        true
    }

    /// Tear the session down and return the access token it held.
    ///
    /// Under one write lock: the epoch moves on, both routines are cancelled
    /// and both tokens are dropped. Identity and policy are kept for
    /// diagnostics.
    pub(crate) async fn end(&self) -> Option<String> {
        let mut state = self.state.write().await;
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.stop_routine(RoutineKind::Heartbeat).await;
        self.stop_routine(RoutineKind::Refresh).await;
        state.refresh_token = None;
        state.access_token.take()
    }

    pub(crate) fn slot(&self, kind: RoutineKind) -> &Mutex<Option<RoutineHandle>> {
        match kind {
            RoutineKind::Heartbeat => &self.heartbeat,
            RoutineKind::Refresh => &self.refresh,
        }
    }

    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Cancel the routine of this kind, if any.
    ///
    /// An in-flight tick is not aborted; only its next tick is prevented.
    pub(crate) async fn stop_routine(&self, kind: RoutineKind) {
        if let Some(handle) = self.slot(kind).lock().await.take() {
            debug!(routine = %kind, generation = handle.generation, "stopping routine");
            handle.cancel.cancel();
        }
    }

    /// Clear the slot if it still holds the given routine instance.
    ///
    /// A routine ending on its own calls this; when a re-login already
    /// installed a newer instance the slot is left alone.
    pub(crate) async fn release_routine(&self, kind: RoutineKind, generation: u64) {
        let mut slot = self.slot(kind).lock().await;
        if slot.as_ref().is_some_and(|h| h.generation == generation) {
            if let Some(handle) = slot.take() {
                handle.cancel.cancel();
            }
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessTokenProvider for SessionContext {
    async fn access_token(&self) -> Result<String> {
        self.current_token()
            .await
            .ok_or_else(|| DataStackError::auth("no access token held; authenticate first"))
    }
}

/// Ensure routines stop when the last handle to the session goes away
impl Drop for SessionContext {
    fn drop(&mut self) {
        for slot in [self.heartbeat.get_mut(), self.refresh.get_mut()] {
            if let Some(handle) = slot.take() {
                if !handle.cancel.is_cancelled() {
                    warn!(
                        generation = handle.generation,
                        "session dropped while routine running; cancelling"
                    );
                    handle.cancel.cancel();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn details(value: serde_json::Value) -> UserDetails {
        serde_json::from_value(value).unwrap()
    }

    fn idle_handle(generation: u64) -> RoutineHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { token.cancelled().await });
        RoutineHandle { generation, cancel, task }
    }

    #[tokio::test]
    async fn token_provider_fails_fast_before_login() {
        let session = SessionContext::new(Credentials::with_token("http://localhost", "abc"));
        let err = session.access_token().await.unwrap_err();
        assert!(matches!(err, DataStackError::Auth { .. }));
    }

    #[tokio::test]
    async fn token_rotation_is_visible_immediately() {
        let session = SessionContext::new(Credentials::default());
        let epoch = session.logout_epoch();
        let snapshot = SessionSnapshot::from_details(&details(json!({"token": "t1"})));
        assert!(session.replace_if_current(snapshot, epoch).await);
        assert_eq!(session.access_token().await.unwrap(), "t1");

        let rotated = details(json!({"token": "t2", "rToken": "r2"}));
        assert!(session.merge_if_current(&rotated, epoch, &CancellationToken::new()).await);
        assert_eq!(session.access_token().await.unwrap(), "t2");

        assert_eq!(session.end().await.as_deref(), Some("t2"));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn results_read_before_logout_are_discarded() {
        let session = SessionContext::new(Credentials::default());
        let before = session.logout_epoch();
        session.end().await;

        let snapshot = SessionSnapshot::from_details(&details(json!({"token": "late"})));
        assert!(!session.replace_if_current(snapshot, before).await);

        let rotated = details(json!({"token": "t2", "rToken": "r2"}));
        assert!(!session.merge_if_current(&rotated, before, &CancellationToken::new()).await);
        assert_eq!(session.current_token().await, None);
    }

    #[tokio::test]
    async fn cancelled_tick_does_not_merge() {
        let session = SessionContext::new(Credentials::default());
        let epoch = session.logout_epoch();
        let snapshot = SessionSnapshot::from_details(&details(json!({"token": "t1"})));
        session.replace_if_current(snapshot, epoch).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let rotated = details(json!({"token": "t2"}));
        assert!(!session.merge_if_current(&rotated, epoch, &cancel).await);
        assert_eq!(session.current_token().await.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn end_cancels_running_routines() {
        let session = SessionContext::new(Credentials::default());
        let handle = idle_handle(session.next_generation());
        let cancel = handle.cancel.clone();
        *session.slot(RoutineKind::Heartbeat).lock().await = Some(handle);

        session.end().await;
        assert!(cancel.is_cancelled());
        assert!(!session.is_routine_active(RoutineKind::Heartbeat).await);
    }

    #[tokio::test]
    async fn release_only_clears_matching_generation() {
        let session = SessionContext::new(Credentials::default());
        *session.slot(RoutineKind::Heartbeat).lock().await = Some(idle_handle(2));

        session.release_routine(RoutineKind::Heartbeat, 1).await;
        assert!(session.is_routine_active(RoutineKind::Heartbeat).await);

        session.release_routine(RoutineKind::Heartbeat, 2).await;
        assert!(!session.is_routine_active(RoutineKind::Heartbeat).await);
    }

    #[tokio::test]
    async fn stop_cancels_the_handle() {
        let session = SessionContext::new(Credentials::default());
        let handle = idle_handle(session.next_generation());
        let cancel = handle.cancel.clone();
        *session.slot(RoutineKind::Refresh).lock().await = Some(handle);

        session.stop_routine(RoutineKind::Refresh).await;
        assert!(cancel.is_cancelled());
        assert!(!session.is_routine_active(RoutineKind::Refresh).await);
    }

    #[test]
    fn routine_kind_names() {
        assert_eq!(RoutineKind::Heartbeat.to_string(), "heartbeat");
        assert_eq!("REFRESH".parse::<RoutineKind>().unwrap(), RoutineKind::Refresh);
    }
}
