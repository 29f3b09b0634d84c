//! # Endpoint
//!
//! An (address, port) pair identifying a communication peer. Port `0` means
//! "any" when binding.

use std::fmt;
use std::net::SocketAddrV4;
use std::str::FromStr;

use crate::error::CodecError;
use crate::network::address::Address;
use crate::network::buffer::AddressBuffer;
use crate::network::codec;
use crate::network::family::AddressFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub address: Address,
    pub port: u16,
}

impl Endpoint {
    pub const MIN_PORT: u16 = 0;
    pub const MAX_PORT: u16 = u16::MAX;

    pub const fn new(address: Address, port: u16) -> Self {
        Self { address, port }
    }

    pub const fn family(&self) -> AddressFamily {
        self.address.family()
    }

    /// Encodes this endpoint into the buffer the socket primitives expect.
    pub fn serialize(&self) -> Result<AddressBuffer, CodecError> {
        codec::serialize(self)
    }

    /// Builds a fresh endpoint from a buffer reported by a socket primitive.
    pub fn create(buffer: &AddressBuffer) -> Result<Endpoint, CodecError> {
        codec::deserialize(buffer.as_bytes())
    }

    pub fn to_socket_addr(&self) -> Option<SocketAddrV4> {
        self.address
            .to_ipv4()
            .map(|ip| SocketAddrV4::new(ip, self.port))
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Endpoint::new(Address::from(*addr.ip()), addr.port())
    }
}

impl FromStr for Endpoint {
    type Err = CodecError;

    /// Parses `a.b.c.d:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<SocketAddrV4>()
            .map(Endpoint::from)
            .map_err(|e| CodecError::InvalidAddress(format!("'{s}': {e}")))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
