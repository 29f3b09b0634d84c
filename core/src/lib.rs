//! Network readiness for devices that must not start work before their
//! primary interface holds an IPv4 address and, optionally, the wall clock
//! has been set.
//!
//! The [`readiness::ReadinessCoordinator`] is the entry point. It talks to the
//! platform only through the traits in [`ports`]; [`host`] provides the
//! implementations for a regular host.

pub mod cancel;
pub mod config;
pub mod error;
pub mod host;
pub mod ports;
pub mod readiness;
pub mod signal;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cancel::CancelToken;
pub use config::ReadinessConfig;
pub use error::ReadinessError;
pub use readiness::{ReadinessCoordinator, ReadinessState};
