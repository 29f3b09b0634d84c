//! The two ways of waiting for the target interface to get its address, plus
//! the clock gate both share.
//!
//! [`EventWait`] consumes address-change notifications pushed into a channel
//! by the platform's event context. [`PollWait`] queries the interface list
//! on a fixed interval. Both stop when their `cancelled` probe says so.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Datelike, Utc};
use netready_common::network::{Address, AddressChange, InterfaceType};
use tracing::trace;

use crate::ports::{Clock, InterfaceRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    Satisfied,
    Cancelled,
}

/// Decides whether the target interface has the address we are waiting for.
pub(crate) struct AddressProbe<'a> {
    pub(crate) network: &'a dyn InterfaceRepository,
    pub(crate) target: InterfaceType,
    /// Set when a static configuration was requested.
    pub(crate) desired: Option<Address>,
}

impl AddressProbe<'_> {
    pub(crate) fn is_satisfied(&self) -> anyhow::Result<bool> {
        let interfaces = self.network.list_interfaces()?;
        Ok(interfaces
            .iter()
            .find(|iface| iface.kind == self.target)
            .is_some_and(|iface| self.accepts(iface.ipv4_address)))
    }

    pub(crate) fn matches(&self, change: &AddressChange) -> bool {
        change.kind == self.target && self.accepts(change.ipv4_address)
    }

    fn accepts(&self, address: Address) -> bool {
        !address.is_any() && self.desired.is_none_or(|desired| desired == address)
    }
}

pub(crate) trait AddressWait {
    fn wait_for_address(
        &mut self,
        probe: &AddressProbe<'_>,
        cancelled: &dyn Fn() -> bool,
    ) -> anyhow::Result<Wait>;
}

/// Event-driven strategy.
///
/// The receive timeout only bounds how long a superseded worker lingers; no
/// interface query happens after the initial check.
pub(crate) struct EventWait {
    events: Receiver<AddressChange>,
    recheck: Duration,
}

impl EventWait {
    pub(crate) fn new(events: Receiver<AddressChange>, recheck: Duration) -> Self {
        Self { events, recheck }
    }
}

impl AddressWait for EventWait {
    fn wait_for_address(
        &mut self,
        probe: &AddressProbe<'_>,
        cancelled: &dyn Fn() -> bool,
    ) -> anyhow::Result<Wait> {
        if probe.is_satisfied()? {
            return Ok(Wait::Satisfied);
        }

        loop {
            match self.events.recv_timeout(self.recheck) {
                Ok(change) if probe.matches(&change) => return Ok(Wait::Satisfied),
                Ok(change) => {
                    trace!("ignoring address change on {} ({})", change.name, change.ipv4_address);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if cancelled() {
                        return Ok(Wait::Cancelled);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    if cancelled() {
                        return Ok(Wait::Cancelled);
                    }
                    return Err(anyhow!(
                        "address-change subscription closed before the {} interface got an address",
                        probe.target
                    ));
                }
            }
        }
    }
}

/// Polling strategy. Cancellation is checked before every query and sleep.
pub(crate) struct PollWait {
    interval: Duration,
}

impl PollWait {
    pub(crate) fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AddressWait for PollWait {
    fn wait_for_address(
        &mut self,
        probe: &AddressProbe<'_>,
        cancelled: &dyn Fn() -> bool,
    ) -> anyhow::Result<Wait> {
        loop {
            if cancelled() {
                return Ok(Wait::Cancelled);
            }
            if probe.is_satisfied()? {
                return Ok(Wait::Satisfied);
            }
            thread::sleep(self.interval);
        }
    }
}

pub(crate) fn is_clock_plausible(now: DateTime<Utc>, min_valid_year: i32) -> bool {
    now.year() >= min_valid_year
}

/// Sleeps in `interval` steps until the clock reports a plausible year.
pub(crate) fn wait_for_clock(
    clock: &dyn Clock,
    min_valid_year: i32,
    interval: Duration,
    cancelled: &dyn Fn() -> bool,
) -> Wait {
    loop {
        if cancelled() {
            return Wait::Cancelled;
        }
        let now = clock.now_utc();
        if is_clock_plausible(now, min_valid_year) {
            return Wait::Satisfied;
        }
        trace!("clock reads {now}, waiting for year {min_valid_year}");
        thread::sleep(interval);
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
