//! # data.stack Infrastructure
//!
//! The I/O half of the data.stack SDK.
//!
//! This crate contains:
//! - The HTTP transport and the authenticated API client
//! - The session context, authenticator and keep-alive routines
//! - Resource clients for apps, data services, documents, workflow and
//!   transactions
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Pure types and validation live in `datastack-domain`
//! - Resource clients read the token from the shared session on every call
//!
//! ## Example
//! ```no_run
//! use datastack_domain::{Credentials, ListOptions};
//!
//! # async fn run() -> datastack_domain::Result<()> {
//! let ds = datastack_infra::authenticate_by_credentials(Credentials::with_password(
//!     "https://cloud.appveen.com",
//!     "admin@appveen.com",
//!     "secret",
//! ))
//! .await?;
//!
//! let app = ds.app("Adam").await?;
//! for service in app.list_data_services(ListOptions::new()).await? {
//!     println!("{}", service.id());
//! }
//! ds.logout().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod resources;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ApiClient, StaticTokenProvider};
pub use auth::{Authenticator, RoutineKind, SessionContext};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use resources::*;

use datastack_domain::{Credentials, Result};

/// Log in with username and password and return the root handle.
///
/// # Errors
/// See [`DataStack::authenticate_by_credentials`].
pub async fn authenticate_by_credentials(credentials: Credentials) -> Result<DataStack> {
    DataStack::authenticate_by_credentials(credentials).await
}

/// Check an existing token and return the root handle.
///
/// # Errors
/// See [`DataStack::authenticate_by_token`].
pub async fn authenticate_by_token(credentials: Credentials) -> Result<DataStack> {
    DataStack::authenticate_by_token(credentials).await
}
