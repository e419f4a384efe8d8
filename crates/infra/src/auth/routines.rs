//! Heartbeat and token refresh routines
//!
//! Both routines are tokio tasks driven by a `CancellationToken`. At most one
//! instance of each runs per session; arming a routine cancels the previous
//! instance first.
//!
//! On a 401 a routine re-logs in once (when username and password are held)
//! and then ends; the re-login arms fresh instances as the new policy
//! dictates. Any other failure is logged and the routine keeps ticking.

use std::sync::{Arc, Weak};
use std::time::Duration;

use datastack_domain::constants::{HEARTBEAT_SAFETY_MARGIN_MS, JWT_SCHEME, REFRESH_LEAD_TIME_SECS};
use datastack_domain::{DataStackError, Result, SessionPolicy, UserDetails};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::authenticator::Authenticator;
use super::session::{RoutineHandle, RoutineKind, SessionContext};
use crate::http::HttpClient;

/// Heartbeat period: one second short of the server's interval.
///
/// `None` when the result would not be positive.
pub fn heartbeat_interval(policy: &SessionPolicy) -> Option<Duration> {
    policy
        .heartbeat_interval_secs
        .saturating_mul(1000)
        .checked_sub(HEARTBEAT_SAFETY_MARGIN_MS)
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Refresh period: five minutes before the token lifetime ends.
///
/// `None` when the token lifetime is five minutes or less.
pub fn refresh_interval(policy: &SessionPolicy) -> Option<Duration> {
    policy
        .token_duration_secs()
        .checked_sub(REFRESH_LEAD_TIME_SECS)
        .filter(|secs| *secs > 0)
        .map(|secs| Duration::from_millis(secs.saturating_mul(1000)))
}

fn interval_for(kind: RoutineKind, policy: &SessionPolicy) -> Option<Duration> {
    match kind {
        RoutineKind::Heartbeat => heartbeat_interval(policy),
        RoutineKind::Refresh => refresh_interval(policy),
    }
}

fn required(kind: RoutineKind, policy: &SessionPolicy) -> bool {
    match kind {
        RoutineKind::Heartbeat => policy.requires_heartbeat(),
        RoutineKind::Refresh => policy.requires_refresh(),
    }
}

/// Arm or stop both routines according to the current session policy.
///
/// Nothing is armed once a logout has moved the session past `epoch`.
pub(crate) async fn apply_policy(auth: &Authenticator, epoch: u64) {
    let policy = auth.session().snapshot().await.policy;
    for kind in [RoutineKind::Heartbeat, RoutineKind::Refresh] {
        if required(kind, &policy) {
            start(auth, kind, &policy, epoch).await;
        } else {
            auth.session().stop_routine(kind).await;
        }
    }
}

async fn start(auth: &Authenticator, kind: RoutineKind, policy: &SessionPolicy, epoch: u64) {
    let session = auth.session();
    let Some(period) = interval_for(kind, policy) else {
        warn!(routine = %kind, ?policy, "computed routine period is not positive; not started");
        session.stop_routine(kind).await;
        return;
    };

    // The slot stays locked until the new handle is stored so a routine
    // ending early cannot observe a half-installed state. Logout bumps the
    // epoch before it takes this lock, so either the check below fails or
    // logout cancels the handle stored here.
    let mut slot = session.slot(kind).lock().await;
    if session.logout_epoch() != epoch {
        debug!(routine = %kind, "session logged out; routine not started");
        return;
    }
    if let Some(previous) = slot.take() {
        debug!(routine = %kind, generation = previous.generation, "replacing routine");
        previous.cancel.cancel();
    }

    let generation = session.next_generation();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(routine_task(
        kind,
        period,
        generation,
        cancel.clone(),
        auth.http().clone(),
        Arc::downgrade(session),
    ));
    *slot = Some(RoutineHandle { generation, cancel, task });

    info!(routine = %kind, generation, period_ms = period.as_millis() as u64, "routine started");
}

// Boxed so the routine future, which may re-login and arm new routines,
// does not contain its own type.
fn routine_task(
    kind: RoutineKind,
    period: Duration,
    generation: u64,
    cancel: CancellationToken,
    http: HttpClient,
    session: Weak<SessionContext>,
) -> BoxFuture<'static, ()> {
    run(kind, period, generation, cancel, http, session).boxed()
}

async fn run(
    kind: RoutineKind,
    period: Duration,
    generation: u64,
    cancel: CancellationToken,
    http: HttpClient,
    session: Weak<SessionContext>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(routine = %kind, generation, "routine cancelled");
                break;
            }
            _ = tokio::time::sleep(period) => {}
        }

        let Some(session) = session.upgrade() else {
            debug!(routine = %kind, generation, "session gone; routine ending");
            break;
        };
        let auth = Authenticator::from_parts(http.clone(), session);

        info!(routine = %kind, generation, "routine triggered");
        let epoch = auth.session().logout_epoch();
        match tick(&auth, kind).await {
            Ok(details) => {
                if !auth.session().merge_if_current(&details, epoch, &cancel).await {
                    debug!(routine = %kind, generation, "routine stopped mid-tick");
                    break;
                }
            }
            Err(err) if err.is_unauthorized() => {
                warn!(routine = %kind, generation, "session rejected with 401");
                if auth.session().credentials().can_relogin() && !cancel.is_cancelled() {
                    if let Err(e) = auth.login_as_of(epoch).await {
                        error!(routine = %kind, error = %e, "re-login failed");
                    }
                }
                auth.session().release_routine(kind, generation).await;
                break;
            }
            Err(err) => {
                error!(
                    routine = %kind,
                    generation,
                    status = ?err.status_code(),
                    error = %err,
                    "routine tick failed"
                );
            }
        }
    }
}

async fn tick(auth: &Authenticator, kind: RoutineKind) -> Result<UserDetails> {
    let snapshot = auth.session().snapshot().await;
    let token = snapshot
        .access_token
        .ok_or_else(|| DataStackError::auth("no access token held"))?;
    let authorization = format!("{JWT_SCHEME} {token}");

    let request = match kind {
        RoutineKind::Heartbeat => auth
            .http()
            .request(Method::PUT, auth.rbac_url("/usr/hb"))
            .header(AUTHORIZATION, authorization)
            .json(&json!({ "uuid": snapshot.identity.uuid })),
        RoutineKind::Refresh => {
            let refresh_token = snapshot.refresh_token.unwrap_or_default();
            auth.http()
                .request(Method::GET, auth.rbac_url("/refresh"))
                .header("rToken", format!("{JWT_SCHEME} {refresh_token}"))
                .header(AUTHORIZATION, authorization)
        }
    };

    auth.call(request).await
}
