//! Interface model shared by the readiness coordinator and the adapters that
//! query the platform.

use std::fmt;
use std::str::FromStr;

use crate::network::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceType {
    #[default]
    Ethernet,
    Wireless80211,
    WirelessAp,
    Loopback,
    Unknown,
}

impl FromStr for InterfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethernet" | "eth" | "wired" => Ok(InterfaceType::Ethernet),
            "wifi" | "wireless" | "wlan" => Ok(InterfaceType::Wireless80211),
            "ap" | "wireless-ap" => Ok(InterfaceType::WirelessAp),
            "loopback" | "lo" => Ok(InterfaceType::Loopback),
            _ => Err(format!("unknown interface type: {s}")),
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterfaceType::Ethernet => "ethernet",
            InterfaceType::Wireless80211 => "wifi",
            InterfaceType::WirelessAp => "wireless-ap",
            InterfaceType::Loopback => "loopback",
            InterfaceType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Snapshot of one interface as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceState {
    pub name: String,
    pub kind: InterfaceType,
    /// [`Address::ANY`] while no IPv4 address is assigned.
    pub ipv4_address: Address,
    pub is_dhcp_enabled: bool,
}

impl InterfaceState {
    pub fn new(name: impl Into<String>, kind: InterfaceType) -> Self {
        Self {
            name: name.into(),
            kind,
            ipv4_address: Address::ANY,
            is_dhcp_enabled: false,
        }
    }

    pub fn with_ipv4(mut self, address: Address) -> Self {
        self.ipv4_address = address;
        self
    }

    pub fn with_dhcp(mut self, enabled: bool) -> Self {
        self.is_dhcp_enabled = enabled;
        self
    }

    pub fn has_ipv4_address(&self) -> bool {
        !self.ipv4_address.is_any()
    }
}

/// Delivered to subscribers whenever an interface's IPv4 address changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressChange {
    pub name: String,
    pub kind: InterfaceType,
    pub ipv4_address: Address,
}

impl From<&InterfaceState> for AddressChange {
    fn from(state: &InterfaceState) -> Self {
        Self {
            name: state.name.clone(),
            kind: state.kind,
            ipv4_address: state.ipv4_address,
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
