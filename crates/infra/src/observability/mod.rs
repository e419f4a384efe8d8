//! Tracing setup
//!
//! The SDK only emits `tracing` events. Applications normally install their
//! own subscriber; [`init_tracing`] is a convenience for scripts and is what
//! `Credentials::trace` switches on.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset and tracing is requested
pub const TRACE_DIRECTIVE: &str = "datastack_infra=info,datastack_domain=info";

/// Directive used when `RUST_LOG` is unset and tracing is not requested
pub const QUIET_DIRECTIVE: &str = "error";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set. Returns `false` when a global subscriber was
/// already installed, in which case nothing changes.
pub fn init_tracing(trace: bool) -> bool {
    let fallback = if trace { TRACE_DIRECTIVE } else { QUIET_DIRECTIVE };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}
