//! # data.stack Domain
//!
//! Domain types for the data.stack SDK.
//!
//! This crate contains:
//! - The SDK error taxonomy and `Result` alias
//! - Credentials, login responses and the server-dictated session policy
//! - Wire models for apps, data services, schema fields, roles, hooks,
//!   documents, list options, math, workflow and transactions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other data.stack crates
//! - No I/O; everything here is plain data plus validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
