//! # Outbound Ports
//!
//! Contracts for everything the coordinator asks of the platform.
//!
//! ## Rules
//! 1. All items here are traits (plus the handle types they exchange).
//! 2. Implementations live in [`host`](crate::host) or, for tests, in `testing`.
//! 3. Commands are synchronous and side-effecting; the coordinator owns the
//!    settle delay that follows them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use netready_common::network::{Address, AddressChange, InterfaceState};

/// Callback invoked from the platform's event context on address changes.
pub type AddressChangeCallback = Arc<dyn Fn(&AddressChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Interface enumeration, configuration and change notification.
pub trait InterfaceRepository: Send + Sync {
    fn list_interfaces(&self) -> anyhow::Result<Vec<InterfaceState>>;

    fn apply_static_ipv4(
        &self,
        iface: &InterfaceState,
        address: Address,
        subnet_mask: Address,
        gateway: Address,
    ) -> anyhow::Result<()>;

    fn apply_dhcp(&self, iface: &InterfaceState) -> anyhow::Result<()>;

    /// `dns` never holds more than two servers.
    fn apply_static_dns(&self, iface: &InterfaceState, dns: &[Address]) -> anyhow::Result<()>;

    fn apply_automatic_dns(&self, iface: &InterfaceState) -> anyhow::Result<()>;

    /// Registers `callback` for changes on any interface; filtering is the caller's job.
    fn subscribe_address_changes(
        &self,
        callback: AddressChangeCallback,
    ) -> anyhow::Result<SubscriptionId>;

    fn unsubscribe_address_changes(&self, id: SubscriptionId);
}

/// Wall-clock source used for the plausibility check only.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}
