//! Desired static IPv4 configuration. Absence of one means DHCP with
//! automatic DNS.

use std::fmt;

use crate::error::CodecError;
use crate::network::address::Address;

/// At most this many DNS servers can be applied statically.
pub const MAX_DNS_SERVERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpConfiguration {
    address: Address,
    subnet_mask: Address,
    gateway: Address,
    dns: Vec<Address>,
}

impl IpConfiguration {
    pub fn new(address: Address, subnet_mask: Address, gateway: Address) -> Result<Self, CodecError> {
        if address.is_any() {
            return Err(CodecError::InvalidConfiguration(
                "static address must not be 0.0.0.0".into(),
            ));
        }
        if prefix_of(subnet_mask).is_none() {
            return Err(CodecError::InvalidConfiguration(format!(
                "subnet mask {subnet_mask} is not contiguous"
            )));
        }
        Ok(Self {
            address,
            subnet_mask,
            gateway,
            dns: Vec::new(),
        })
    }

    /// Parses `a.b.c.d/prefix` plus a gateway.
    pub fn from_cidr(cidr: &str, gateway: Address) -> Result<Self, CodecError> {
        let Some((ip_str, prefix_str)) = cidr.split_once('/') else {
            return Err(CodecError::InvalidConfiguration(format!(
                "expected ADDRESS/PREFIX, got '{cidr}'"
            )));
        };
        let address: Address = ip_str.parse()?;
        let prefix = prefix_str.parse::<u8>().map_err(|e| {
            CodecError::InvalidConfiguration(format!("invalid prefix '{prefix_str}': {e}"))
        })?;
        Self::new(address, mask_from_prefix(prefix)?, gateway)
    }

    pub fn with_dns(mut self, dns: Vec<Address>) -> Result<Self, CodecError> {
        if dns.len() > MAX_DNS_SERVERS {
            return Err(CodecError::InvalidConfiguration(format!(
                "at most {MAX_DNS_SERVERS} DNS servers can be set, got {}",
                dns.len()
            )));
        }
        self.dns = dns;
        Ok(self)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn subnet_mask(&self) -> Address {
        self.subnet_mask
    }

    pub fn gateway(&self) -> Address {
        self.gateway
    }

    /// Static DNS servers. Empty means DNS is left automatic.
    pub fn dns(&self) -> &[Address] {
        &self.dns
    }

    pub fn prefix_len(&self) -> u8 {
        prefix_of(self.subnet_mask).unwrap_or(0)
    }
}

impl fmt::Display for IpConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} via {}", self.address, self.prefix_len(), self.gateway)?;
        if !self.dns.is_empty() {
            let servers: Vec<String> = self.dns.iter().map(ToString::to_string).collect();
            write!(f, " dns {}", servers.join(","))?;
        }
        Ok(())
    }
}

pub fn mask_from_prefix(prefix: u8) -> Result<Address, CodecError> {
    if prefix > 32 {
        return Err(CodecError::InvalidConfiguration(format!(
            "prefix /{prefix} is longer than 32 bits"
        )));
    }
    let bits: u32 = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    Ok(Address::from_octets(bits.to_be_bytes()))
}

/// Prefix length of a contiguous mask.
fn prefix_of(mask: Address) -> Option<u8> {
    let bits = u32::from_be_bytes(mask.octets());
    if bits.leading_ones() + bits.trailing_zeros() == 32 {
        u8::try_from(bits.leading_ones()).ok()
    } else {
        None
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
