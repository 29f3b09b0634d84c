use anyhow::{Context, bail};
use colored::*;
use netready_common::network::{AddressBuffer, Endpoint};

use crate::terminal::{colors, print};

pub fn decode(hex: &str) -> anyhow::Result<()> {
    let bytes = from_hex(hex)?;
    let buffer = AddressBuffer::from_bytes(bytes);
    let endpoint = Endpoint::create(&buffer).context("not a valid IPv4 socket address")?;

    print::set_key_width(&["Family", "Address", "Port"]);
    print::aligned_line("Family", format!("{:?}", endpoint.family()));
    print::aligned_line("Address", endpoint.address.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Port", endpoint.port.to_string());
    Ok(())
}

/// Accepts plain or space/colon separated hex pairs.
pub fn from_hex(hex: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = hex
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if !digits.is_ascii() {
        bail!("hex input contains non-ASCII characters");
    }
    if digits.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separated_hex() {
        assert_eq!(from_hex("02:00 19 65").unwrap(), vec![0x02, 0x00, 0x19, 0x65]);
    }

    #[test]
    fn rejects_odd_and_invalid_digits() {
        assert!(from_hex("020").is_err());
        assert!(from_hex("zz").is_err());
    }
}
