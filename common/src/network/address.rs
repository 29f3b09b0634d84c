//! # IPv4 Address
//!
//! An opaque 32-bit IPv4 value tagged with its address family.
//!
//! The integer is packed the way the socket primitives read it: the first
//! dotted-quad octet sits in the least significant byte, so `127.0.0.1` is
//! `0x0100007F`.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::CodecError;
use crate::network::family::AddressFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    family: AddressFamily,
    value: u32,
}

impl Address {
    /// `0.0.0.0`, used when binding to every local interface.
    pub const ANY: Address = Address::new(0);
    /// `127.0.0.1`.
    pub const LOOPBACK: Address = Address::new(0x0100_007F);
    /// `255.255.255.255`.
    pub const BROADCAST: Address = Address::new(0xFFFF_FFFF);

    /// Creates an IPv4 address from its packed value.
    pub const fn new(value: u32) -> Self {
        Self {
            family: AddressFamily::InterNetwork,
            value,
        }
    }

    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self::new(u32::from_le_bytes(octets))
    }

    /// Wraps a value reported under a foreign family.
    ///
    /// Such addresses can be carried around but not snapshotted or encoded.
    pub const fn with_family(family: AddressFamily, value: u32) -> Self {
        Self { family, value }
    }

    pub const fn family(&self) -> AddressFamily {
        self.family
    }

    /// The packed value, first octet in the low byte.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Octets in dotted-quad order.
    pub const fn octets(&self) -> [u8; 4] {
        self.value.to_le_bytes()
    }

    pub const fn is_any(&self) -> bool {
        self.value == 0
    }

    /// Returns an independent copy to hand to a socket primitive.
    ///
    /// Whatever the caller does to its own binding afterwards, the copy keeps
    /// the value observed at bind/connect time.
    pub fn snapshot(&self) -> Result<Address, CodecError> {
        match self.family {
            AddressFamily::InterNetwork => Ok(Address::new(self.value)),
            other => Err(CodecError::UnsupportedFamily(other.code())),
        }
    }

    pub fn to_ipv4(&self) -> Option<Ipv4Addr> {
        match self.family {
            AddressFamily::InterNetwork => Some(Ipv4Addr::from(self.octets())),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Address {
    type Error = CodecError;

    /// Accepts a packed value held in a wider signed integer.
    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        u32::try_from(raw)
            .map(Address::new)
            .map_err(|_| CodecError::AddressOutOfRange(raw))
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Self {
        Address::from_octets(addr.octets())
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Ipv4Addr>()
            .map(Address::from)
            .map_err(|e| CodecError::InvalidAddress(format!("'{s}': {e}")))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_ipv4() {
            Some(ipv4) => write!(f, "{ipv4}"),
            None => write!(f, "{:?}:{:#010x}", self.family, self.value),
        }
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
