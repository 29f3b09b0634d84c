use colored::*;
use netready_common::network::Endpoint;

use crate::terminal::{colors, print};

pub fn encode(endpoint: &Endpoint) -> anyhow::Result<()> {
    let buffer = endpoint.serialize()?;

    print::set_key_width(&["Endpoint", "Bytes", "Hash"]);
    print::aligned_line("Endpoint", endpoint.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Bytes", to_hex(buffer.as_bytes()));
    print::aligned_line("Hash", format!("{:#010x}", buffer.fold_hash()));
    Ok(())
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
