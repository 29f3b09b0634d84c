//! # Netready Common
//!
//! Shared networking vocabulary for the readiness coordinator and anything that
//! talks to the socket primitives.
//!
//! * **[`network`]**: IPv4 addresses, endpoints, the fixed-size address buffer
//!   codec, socket enumerations and the interface model.
//! * **[`error`]**: Failures raised while encoding or decoding addresses.

pub mod error;
pub mod network;

pub use error::CodecError;
