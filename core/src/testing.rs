//! Scriptable stand-ins for the platform, used by unit and integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::bail;
use chrono::{DateTime, TimeZone, Utc};
use netready_common::network::{Address, AddressChange, InterfaceState, InterfaceType};

use crate::ports::{AddressChangeCallback, Clock, InterfaceRepository, SubscriptionId};

/// Address handed out when DHCP is requested.
pub const DHCP_LEASE: Address = Address::from_octets([192, 168, 0, 100]);

#[derive(Default)]
struct MockState {
    interfaces: Vec<InterfaceState>,
    /// Assignments held back until [`MockNetwork::assign_pending`].
    pending: Vec<(String, Address)>,
    static_applied: Option<Address>,
    static_dns: Vec<Address>,
    dhcp_applied: bool,
    subscribers: HashMap<u64, AddressChangeCallback>,
}

/// In-memory interface repository.
///
/// Configuration commands assign the requested address (or [`DHCP_LEASE`])
/// to the interface and notify subscribers, unless assignment is delayed.
#[derive(Default)]
pub struct MockNetwork {
    state: Mutex<MockState>,
    next_id: AtomicU64,
    delayed: bool,
    apply_error: Option<String>,
}

impl MockNetwork {
    pub fn new(interfaces: Vec<InterfaceState>) -> Self {
        Self {
            state: Mutex::new(MockState {
                interfaces,
                ..MockState::default()
            }),
            ..Self::default()
        }
    }

    /// A device with a single unconfigured `eth0`.
    pub fn ethernet() -> Self {
        Self::new(vec![InterfaceState::new("eth0", InterfaceType::Ethernet)])
    }

    pub fn with_delayed_assignment(mut self) -> Self {
        self.delayed = true;
        self
    }

    pub fn failing_on_apply(mut self, message: &str) -> Self {
        self.apply_error = Some(message.to_string());
        self
    }

    /// Changes an interface's address and notifies subscribers.
    pub fn set_address(&self, name: &str, address: Address) {
        let (change, subscribers) = {
            let mut state = self.lock();
            let Some(iface) = state.interfaces.iter_mut().find(|iface| iface.name == name) else {
                return;
            };
            iface.ipv4_address = address;
            let change = AddressChange::from(&*iface);
            (change, state.subscribers.values().cloned().collect::<Vec<_>>())
        };

        for callback in subscribers {
            callback(&change);
        }
    }

    /// Completes every assignment held back by delayed mode.
    pub fn assign_pending(&self) {
        let pending = std::mem::take(&mut self.lock().pending);
        for (name, address) in pending {
            self.set_address(&name, address);
        }
    }

    pub fn static_applied(&self) -> Option<Address> {
        self.lock().static_applied
    }

    pub fn static_dns(&self) -> Vec<Address> {
        self.lock().static_dns.clone()
    }

    pub fn dhcp_applied(&self) -> bool {
        self.lock().dhcp_applied
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn assign(&self, name: &str, address: Address) {
        if self.delayed {
            self.lock().pending.push((name.to_string(), address));
        } else {
            self.set_address(name, address);
        }
    }

    fn check_apply(&self) -> anyhow::Result<()> {
        match &self.apply_error {
            Some(message) => bail!("{message}"),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InterfaceRepository for MockNetwork {
    fn list_interfaces(&self) -> anyhow::Result<Vec<InterfaceState>> {
        Ok(self.lock().interfaces.clone())
    }

    fn apply_static_ipv4(
        &self,
        iface: &InterfaceState,
        address: Address,
        _subnet_mask: Address,
        _gateway: Address,
    ) -> anyhow::Result<()> {
        self.check_apply()?;
        {
            let mut state = self.lock();
            state.static_applied = Some(address);
            if let Some(entry) = state.interfaces.iter_mut().find(|i| i.name == iface.name) {
                entry.is_dhcp_enabled = false;
            }
        }
        self.assign(&iface.name, address);
        Ok(())
    }

    fn apply_dhcp(&self, iface: &InterfaceState) -> anyhow::Result<()> {
        self.check_apply()?;
        {
            let mut state = self.lock();
            state.dhcp_applied = true;
            if let Some(entry) = state.interfaces.iter_mut().find(|i| i.name == iface.name) {
                entry.is_dhcp_enabled = true;
            }
        }
        self.assign(&iface.name, DHCP_LEASE);
        Ok(())
    }

    fn apply_static_dns(&self, _iface: &InterfaceState, dns: &[Address]) -> anyhow::Result<()> {
        self.check_apply()?;
        self.lock().static_dns = dns.to_vec();
        Ok(())
    }

    fn apply_automatic_dns(&self, _iface: &InterfaceState) -> anyhow::Result<()> {
        self.check_apply()?;
        self.lock().static_dns.clear();
        Ok(())
    }

    fn subscribe_address_changes(
        &self,
        callback: AddressChangeCallback,
    ) -> anyhow::Result<SubscriptionId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().subscribers.insert(id, callback);
        Ok(SubscriptionId(id))
    }

    fn unsubscribe_address_changes(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id.0);
    }
}

/// Clock whose reading only moves when a test says so.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// 1970-01-01, what an RTC-less device reads after power-up.
    pub fn epoch() -> Self {
        Self {
            now: Mutex::new(DateTime::<Utc>::default()),
        }
    }

    pub fn at_year(year: i32) -> Self {
        let clock = Self::epoch();
        clock.set_year(year);
        clock
    }

    pub fn set_year(&self, year: i32) {
        if let Some(at) = Utc.with_ymd_and_hms(year, 1, 1, 12, 0, 0).single() {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
        }
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
