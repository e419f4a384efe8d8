//! SDK constants
//!
//! Server-policy defaults and timing margins shared by the session manager
//! and the resource clients.

// Session policy defaults (applied when a login response omits the field)
pub const DEFAULT_HB_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_USER_TOKEN_DURATION_SECS: u64 = 600;
pub const DEFAULT_BOT_TOKEN_DURATION_SECS: u64 = 600;
pub const DEFAULT_TIMEZONE: &str = "Zulu";

// Heartbeat fires this many milliseconds before the server-side timeout
pub const HEARTBEAT_SAFETY_MARGIN_MS: u64 = 1000;

// Token refresh runs this many seconds before the token expires
pub const REFRESH_LEAD_TIME_SECS: u64 = 300;

// Resource client defaults
pub const DEFAULT_LIST_COUNT: i64 = 30;
pub const COUNT_ALL: i64 = -1;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Authorization scheme used by every call after login
pub const JWT_SCHEME: &str = "JWT";
