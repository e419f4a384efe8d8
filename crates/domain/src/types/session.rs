//! Credentials, login responses and the session policy dictated by the server

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOT_TOKEN_DURATION_SECS, DEFAULT_HB_INTERVAL_SECS, DEFAULT_TIMEZONE,
    DEFAULT_USER_TOKEN_DURATION_SECS,
};
use crate::types::app::App;

/// Connection credentials for a data.stack host
///
/// Either `username` + `password` (username may be a bot client id and
/// password its API key) or an existing `token` must be provided.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Base URL of the platform, e.g. `https://cloud.appveen.com`
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Existing bearer token, presented verbatim to the check endpoint
    pub token: Option<String>,
    /// Enable info-level tracing output
    pub trace: bool,
}

impl Credentials {
    #[must_use]
    pub fn with_password(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self { host: host.into(), token: Some(token.into()), ..Self::default() }
    }

    #[must_use]
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Host without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }

    /// `true` when both username and password are present and non-empty.
    ///
    /// Background routines only re-login when this holds.
    pub fn can_relogin(&self) -> bool {
        matches!(
            (self.username.as_deref(), self.password.as_deref()),
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty()
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("trace", &self.trace)
            .finish()
    }
}

/// User details returned by login, check, heartbeat and refresh endpoints
///
/// Every field is optional: heartbeat and refresh responses carry only a
/// subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_details: Option<BasicDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<App>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "rToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_super_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_bot_token_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_hb_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_user_close_window_to_logout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_user_to_single_session: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_user_token_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac_user_token_refresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,
    #[serde(rename = "b2BEnable", skip_serializing_if = "Option::is_none")]
    pub b2b_enable: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Session behaviour switches dictated by the server
///
/// Durations of zero are treated like absent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    pub heartbeat_interval_secs: u64,
    pub single_session: bool,
    pub close_window_logout: bool,
    pub auto_refresh: bool,
    pub bot: bool,
    pub bot_token_duration_secs: u64,
    pub user_token_duration_secs: u64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: DEFAULT_HB_INTERVAL_SECS,
            single_session: false,
            close_window_logout: false,
            auto_refresh: false,
            bot: false,
            bot_token_duration_secs: DEFAULT_BOT_TOKEN_DURATION_SECS,
            user_token_duration_secs: DEFAULT_USER_TOKEN_DURATION_SECS,
        }
    }
}

impl SessionPolicy {
    /// Policy from a login/check response; absent fields take defaults.
    #[must_use]
    pub fn from_details(details: &UserDetails) -> Self {
        let mut policy = Self::default();
        policy.merge(details);
        policy
    }

    /// Apply the fields present in a tick response, keeping the rest.
    pub fn merge(&mut self, details: &UserDetails) {
        if let Some(secs) = details.rbac_hb_interval.filter(|v| *v > 0) {
            self.heartbeat_interval_secs = secs;
        }
        if let Some(secs) = details.rbac_bot_token_duration.filter(|v| *v > 0) {
            self.bot_token_duration_secs = secs;
        }
        if let Some(secs) = details.rbac_user_token_duration.filter(|v| *v > 0) {
            self.user_token_duration_secs = secs;
        }
        if let Some(flag) = details.rbac_user_to_single_session {
            self.single_session = flag;
        }
        if let Some(flag) = details.rbac_user_close_window_to_logout {
            self.close_window_logout = flag;
        }
        if let Some(flag) = details.rbac_user_token_refresh {
            self.auto_refresh = flag;
        }
        if let Some(flag) = details.bot {
            self.bot = flag;
        }
    }

    /// Heartbeat is required by single-session or close-window-logout.
    pub fn requires_heartbeat(&self) -> bool {
        self.single_session || self.close_window_logout
    }

    pub fn requires_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// Lifetime of the access token for this kind of principal.
    pub fn token_duration_secs(&self) -> u64 {
        if self.bot {
            self.bot_token_duration_secs
        } else {
            self.user_token_duration_secs
        }
    }
}

/// Who the session belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Option<String>,
    pub uuid: Option<String>,
}

/// Read-only view of the session state
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Identity,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub server_time: Option<i64>,
    pub default_timezone: String,
    pub policy: SessionPolicy,
}

impl SessionSnapshot {
    /// Empty session as it exists before login.
    #[must_use]
    pub fn empty() -> Self {
        Self { default_timezone: DEFAULT_TIMEZONE.to_string(), ..Self::default() }
    }

    /// Session populated from a login/check response.
    #[must_use]
    pub fn from_details(details: &UserDetails) -> Self {
        Self {
            identity: Identity { id: details.id.clone(), uuid: details.uuid.clone() },
            access_token: details.token.clone().filter(|t| !t.is_empty()),
            refresh_token: details.refresh_token.clone().filter(|t| !t.is_empty()),
            expires_in: details.expires_in,
            server_time: details.server_time,
            default_timezone: details
                .default_timezone
                .clone()
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            policy: SessionPolicy::from_details(details),
        }
    }

    /// Apply a heartbeat or refresh response.
    ///
    /// Tokens are only replaced when the response carries them.
    pub fn merge(&mut self, details: &UserDetails) {
        if let Some(token) = details.token.as_ref().filter(|t| !t.is_empty()) {
            self.access_token = Some(token.clone());
        }
        if let Some(token) = details.refresh_token.as_ref().filter(|t| !t.is_empty()) {
            self.refresh_token = Some(token.clone());
        }
        if details.id.is_some() {
            self.identity.id = details.id.clone();
        }
        if details.uuid.is_some() {
            self.identity.uuid = details.uuid.clone();
        }
        if details.expires_in.is_some() {
            self.expires_in = details.expires_in;
        }
        if details.server_time.is_some() {
            self.server_time = details.server_time;
        }
        if let Some(tz) = details.default_timezone.as_ref().filter(|tz| !tz.is_empty()) {
            self.default_timezone = tz.clone();
        }
        self.policy.merge(details);
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("identity", &self.identity)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("server_time", &self.server_time)
            .field("default_timezone", &self.default_timezone)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn details(value: serde_json::Value) -> UserDetails {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_policy_defaults_when_fields_absent() {
        let policy = SessionPolicy::from_details(&details(json!({"token": "abc"})));

        assert_eq!(policy.heartbeat_interval_secs, 60);
        assert_eq!(policy.user_token_duration_secs, 600);
        assert_eq!(policy.bot_token_duration_secs, 600);
        assert!(!policy.single_session);
        assert!(!policy.close_window_logout);
        assert!(!policy.auto_refresh);
        assert!(!policy.bot);
    }

    #[test]
    fn test_zero_durations_fall_back_to_defaults() {
        let policy = SessionPolicy::from_details(&details(json!({
            "rbacHbInterval": 0,
            "rbacUserTokenDuration": 0
        })));
        assert_eq!(policy.heartbeat_interval_secs, 60);
        assert_eq!(policy.user_token_duration_secs, 600);
    }

    #[test]
    fn test_login_response_populates_snapshot() {
        let snapshot = SessionSnapshot::from_details(&details(json!({
            "_id": "admin@appveen.com",
            "uuid": "u-1",
            "token": "tok",
            "rToken": "rtok",
            "expiresIn": 1_700_000_000,
            "serverTime": 1_699_999_000,
            "rbacHbInterval": 30,
            "rbacUserToSingleSession": true,
            "rbacUserTokenRefresh": true,
            "rbacUserTokenDuration": 900,
            "bot": false
        })));

        assert_eq!(snapshot.identity.id.as_deref(), Some("admin@appveen.com"));
        assert_eq!(snapshot.access_token.as_deref(), Some("tok"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("rtok"));
        assert_eq!(snapshot.default_timezone, "Zulu");
        assert!(snapshot.policy.requires_heartbeat());
        assert!(snapshot.policy.requires_refresh());
        assert_eq!(snapshot.policy.token_duration_secs(), 900);
    }

    #[test]
    fn test_merge_keeps_tokens_absent_from_tick() {
        let mut snapshot = SessionSnapshot::from_details(&details(json!({
            "token": "tok",
            "rToken": "rtok",
            "rbacUserToSingleSession": true
        })));

        snapshot.merge(&details(json!({"rbacUserToSingleSession": false, "rbacHbInterval": 20})));

        assert_eq!(snapshot.access_token.as_deref(), Some("tok"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("rtok"));
        assert!(!snapshot.policy.single_session);
        assert_eq!(snapshot.policy.heartbeat_interval_secs, 20);
    }

    #[test]
    fn test_merge_rotates_tokens() {
        let mut snapshot = SessionSnapshot::from_details(&details(json!({"token": "old"})));
        snapshot.merge(&details(json!({"token": "new", "rToken": "r-new"})));
        assert_eq!(snapshot.access_token.as_deref(), Some("new"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("r-new"));
    }

    #[test]
    fn test_bot_token_duration() {
        let policy = SessionPolicy::from_details(&details(json!({
            "bot": true,
            "rbacBotTokenDuration": 1200,
            "rbacUserTokenDuration": 900
        })));
        assert_eq!(policy.token_duration_secs(), 1200);
    }

    #[test]
    fn test_credentials_relogin_requires_both_fields() {
        assert!(Credentials::with_password("http://h", "u", "p").can_relogin());
        assert!(!Credentials::with_token("http://h", "t").can_relogin());
        assert!(!Credentials::with_password("http://h", "u", "").can_relogin());
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::with_password("http://h/", "user", "hunter2");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(creds.base_url(), "http://h");
    }
}
