//! Session lifecycle: authentication and background keep-alive routines

pub mod authenticator;
pub mod routines;
pub mod session;

pub use authenticator::Authenticator;
pub use routines::{heartbeat_interval, refresh_interval};
pub use session::{RoutineKind, SessionContext};
