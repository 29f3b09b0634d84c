//! # Host Adapter
//!
//! Implements the outbound ports on a regular host using `pnet` for interface
//! enumeration.
//!
//! * Interfaces are classified as loopback, Wi-Fi or Ethernet from their flags
//!   and, where the platform exposes it, the hardware layout.
//! * There are no native address-change events, so a watcher thread diffs
//!   the interface list and notifies subscribers.
//! * In [`HostMode::Observe`] configuration commands are left to the OS. In
//!   [`HostMode::Apply`] they are executed with `ip`, `dhclient` and
//!   `resolvectl` (Linux only, requires root).

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use netready_common::network::{Address, AddressChange, InterfaceState, InterfaceType};
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{self, IpNetwork};
use tracing::{debug, info, trace, warn};

#[cfg(target_os = "macos")]
use macos_impl::{is_physical, is_wireless};
#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use fallback_impl::{is_physical, is_wireless};

use crate::ports::{AddressChangeCallback, Clock, InterfaceRepository, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostMode {
    /// Only watch; the OS owns interface configuration.
    #[default]
    Observe,
    /// Run configuration commands against the host.
    Apply,
}

#[derive(Default)]
struct WatchState {
    subscribers: HashMap<u64, AddressChangeCallback>,
    running: bool,
}

struct HostInner {
    watch: Mutex<WatchState>,
    dhcp: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    watch_interval: Duration,
}

pub struct HostNetwork {
    mode: HostMode,
    inner: Arc<HostInner>,
}

impl HostNetwork {
    pub fn new(mode: HostMode, watch_interval: Duration) -> Self {
        Self {
            mode,
            inner: Arc::new(HostInner {
                watch: Mutex::new(WatchState::default()),
                dhcp: Mutex::new(HashSet::new()),
                next_id: AtomicU64::new(0),
                watch_interval,
            }),
        }
    }

    pub fn mode(&self) -> HostMode {
        self.mode
    }

    fn run(&self, program: &str, args: &[String]) -> anyhow::Result<()> {
        if !cfg!(target_os = "linux") {
            bail!("applying interface configuration is only supported on Linux");
        }
        debug!("running {program} {}", args.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to run {program}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} exited with {}: {}", output.status, stderr.trim());
        }
        Ok(())
    }

    fn observe_only(&self, what: &str, iface: &InterfaceState) -> bool {
        if self.mode == HostMode::Observe {
            info!("observe mode: leaving {what} on {} to the operating system", iface.name);
            return true;
        }
        false
    }
}

impl InterfaceRepository for HostNetwork {
    fn list_interfaces(&self) -> anyhow::Result<Vec<InterfaceState>> {
        Ok(self.inner.snapshot())
    }

    fn apply_static_ipv4(
        &self,
        iface: &InterfaceState,
        address: Address,
        subnet_mask: Address,
        gateway: Address,
    ) -> anyhow::Result<()> {
        lock(&self.inner.dhcp).remove(&iface.name);
        if self.observe_only("static IPv4", iface) {
            return Ok(());
        }

        let mask: Ipv4Addr = subnet_mask
            .to_ipv4()
            .context("subnet mask must be an IPv4 address")?;
        let prefix = ipnetwork::ipv4_mask_to_prefix(mask)?;

        self.run("ip", &args(["addr", "flush", "dev", &iface.name]))?;
        self.run(
            "ip",
            &args(["addr", "add", &format!("{address}/{prefix}"), "dev", &iface.name]),
        )?;
        if !gateway.is_any() {
            self.run(
                "ip",
                &args(["route", "replace", "default", "via", &gateway.to_string(), "dev", &iface.name]),
            )?;
        }
        Ok(())
    }

    fn apply_dhcp(&self, iface: &InterfaceState) -> anyhow::Result<()> {
        lock(&self.inner.dhcp).insert(iface.name.clone());
        if self.observe_only("DHCP", iface) {
            return Ok(());
        }
        self.run("dhclient", &args(["-nw", &iface.name]))
    }

    fn apply_static_dns(&self, iface: &InterfaceState, dns: &[Address]) -> anyhow::Result<()> {
        if self.observe_only("static DNS", iface) {
            return Ok(());
        }
        let mut cmd = args(["dns", &iface.name]);
        cmd.extend(dns.iter().map(ToString::to_string));
        self.run("resolvectl", &cmd)
    }

    fn apply_automatic_dns(&self, iface: &InterfaceState) -> anyhow::Result<()> {
        if self.observe_only("DNS", iface) {
            return Ok(());
        }
        self.run("resolvectl", &args(["revert", &iface.name]))
    }

    fn subscribe_address_changes(
        &self,
        callback: AddressChangeCallback,
    ) -> anyhow::Result<SubscriptionId> {
        self.inner.subscribe(callback, |inner| {
            thread::Builder::new()
                .name("netready-watch".into())
                .spawn(move || inner.watch_loop())
                .map(drop)
        })
    }

    fn unsubscribe_address_changes(&self, id: SubscriptionId) {
        lock(&self.inner.watch).subscribers.remove(&id.0);
    }
}

impl HostInner {
    /// Registers `callback` and starts the watcher through `spawn` if none runs.
    fn subscribe(
        self: &Arc<Self>,
        callback: AddressChangeCallback,
        spawn: impl FnOnce(Arc<HostInner>) -> std::io::Result<()>,
    ) -> anyhow::Result<SubscriptionId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut watch = lock(&self.watch);
        watch.subscribers.insert(id, callback);

        if !watch.running {
            if let Err(err) = spawn(Arc::clone(self)) {
                watch.subscribers.remove(&id);
                return Err(err).context("failed to start the interface watcher");
            }
            watch.running = true;
        }
        Ok(SubscriptionId(id))
    }

    fn snapshot(&self) -> Vec<InterfaceState> {
        let dhcp = lock(&self.dhcp);
        let mut interfaces: Vec<NetworkInterface> = datalink::interfaces();
        // up interfaces first so the coordinator picks a live one
        interfaces.sort_by_key(|iface| !iface.is_up());

        interfaces
            .iter()
            .map(|iface| {
                to_state(iface, is_physical, is_wireless).with_dhcp(dhcp.contains(&iface.name))
            })
            .collect()
    }

    /// Polls the interface list and reports address changes until nobody listens.
    fn watch_loop(&self) {
        let mut known: HashMap<String, Address> = self
            .snapshot()
            .into_iter()
            .map(|state| (state.name, state.ipv4_address))
            .collect();

        loop {
            thread::sleep(self.watch_interval);

            let subscribers: Vec<AddressChangeCallback> = {
                let mut watch = lock(&self.watch);
                if watch.subscribers.is_empty() {
                    watch.running = false;
                    trace!("interface watcher stopped");
                    return;
                }
                watch.subscribers.values().cloned().collect()
            };

            for state in self.snapshot() {
                let previous = known.insert(state.name.clone(), state.ipv4_address);
                if previous == Some(state.ipv4_address) {
                    continue;
                }
                debug!("{} address changed to {}", state.name, state.ipv4_address);
                let change = AddressChange::from(&state);
                for callback in &subscribers {
                    callback(&change);
                }
            }
        }
    }
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

fn to_state(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
    is_wireless: impl Fn(&NetworkInterface) -> bool,
) -> InterfaceState {
    let kind = classify(interface, is_physical, is_wireless);
    let ipv4 = interface
        .ips
        .iter()
        .find_map(|net| match net {
            IpNetwork::V4(v4) => Some(Address::from(v4.ip())),
            IpNetwork::V6(_) => None,
        })
        .unwrap_or(Address::ANY);

    InterfaceState::new(interface.name.clone(), kind).with_ipv4(ipv4)
}

fn classify(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
    is_wireless: impl Fn(&NetworkInterface) -> bool,
) -> InterfaceType {
    if interface.is_loopback() {
        return InterfaceType::Loopback;
    }
    if interface.is_point_to_point() || interface.mac.is_none() {
        return InterfaceType::Unknown;
    }
    if is_wireless(interface) {
        return InterfaceType::Wireless80211;
    }
    if interface.is_broadcast() && is_physical(interface) {
        return InterfaceType::Ethernet;
    }
    InterfaceType::Unknown
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("recovering poisoned host adapter lock");
        PoisonError::into_inner(poisoned)
    })
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(target_os = "macos")]
mod macos_impl {
    use super::*;
    use std::sync::OnceLock;

    struct HardwareInfo {
        physical_devices: HashSet<String>,
        wireless_devices: HashSet<String>,
    }

    /// Runs `networksetup` once and caches the result.
    fn get_hardware_info() -> &'static HardwareInfo {
        static HARDWARE_INFO: OnceLock<HardwareInfo> = OnceLock::new();

        HARDWARE_INFO.get_or_init(|| {
            let mut physical = HashSet::new();
            let mut wireless = HashSet::new();

            if let Ok(output) = Command::new("networksetup").arg("-listallhardwareports").output() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                for line in stdout.lines() {
                    if let Some(device) = line.strip_prefix("Device: ") {
                        physical.insert(device.trim().to_string());
                    }
                }
            }

            for device in &physical {
                let is_wifi = Command::new("networksetup")
                    .arg("-getairportnetwork")
                    .arg(device)
                    .output()
                    .map(|out| out.status.success())
                    .unwrap_or(false);

                if is_wifi {
                    wireless.insert(device.clone());
                }
            }

            HardwareInfo {
                physical_devices: physical,
                wireless_devices: wireless,
            }
        })
    }

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        get_hardware_info().physical_devices.contains(&interface.name)
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        get_hardware_info().wireless_devices.contains(&interface.name)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.mac.is_some()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        let name = interface.name.to_ascii_lowercase();
        name.starts_with("wl") || name.contains("wi-fi")
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
