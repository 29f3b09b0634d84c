use thiserror::Error;

/// Errors raised by the address codec and the address/configuration constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The buffer is shorter than the fixed layout of its address family.
    #[error("address buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    /// Only IPv4 (`InterNetwork`) is supported by this codec.
    #[error("unsupported address family (code {0})")]
    UnsupportedFamily(u16),

    /// Raw address integers must fit in an unsigned 32-bit value.
    #[error("address value {0} is outside 0..=0xFFFFFFFF")]
    AddressOutOfRange(i64),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid IP configuration: {0}")]
    InvalidConfiguration(String),
}
