//! Authenticated JSON API access
//!
//! Every resource client talks to the platform through [`ApiClient`], which
//! reads the current token from an [`AccessTokenProvider`] on each call,
//! sends `Authorization: JWT <token>` and maps non-2xx responses to
//! `DataStackError::Transport`.

pub mod auth;
pub mod client;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::{decode_response, ApiClient, Query};
