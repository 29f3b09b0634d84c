use std::time::Duration;

use colored::*;
use netready_common::network::InterfaceState;
use netready_core::host::{HostMode, HostNetwork};
use netready_core::ports::InterfaceRepository;

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

pub fn interfaces() -> anyhow::Result<()> {
    let host = HostNetwork::new(HostMode::Observe, Duration::from_secs(1));
    let interfaces: Vec<InterfaceState> = host.list_interfaces()?;

    if interfaces.is_empty() {
        print::no_results("no network interfaces found");
        return Ok(());
    }

    for (idx, iface) in interfaces.iter().enumerate() {
        print::tree_head(idx, &iface.name);
        print::as_tree_one_level(details(iface));
    }
    print::fat_separator();
    Ok(())
}

fn details(iface: &InterfaceState) -> Vec<Detail> {
    let address: ColoredString = if iface.has_ipv4_address() {
        iface.ipv4_address.to_string().color(colors::IPV4_ADDR)
    } else {
        "none".dimmed()
    };
    vec![
        ("Type".to_string(), iface.kind.to_string().normal()),
        ("IPv4".to_string(), address),
    ]
}
