//! # Address Codec
//!
//! Converts between [`Endpoint`] and the fixed 16-byte IPv4 [`AddressBuffer`]:
//!
//! | Bytes    | Content                                  |
//! |----------|------------------------------------------|
//! | `0..2`   | address family, low byte first           |
//! | `2..4`   | port, big-endian                         |
//! | `4..8`   | address octets in dotted-quad order      |
//! | `8..16`  | reserved, zero                           |
//!
//! Decoding fails fast: a buffer shorter than the IPv4 layout or tagged with
//! any other family is rejected instead of read past its end.

use tracing::trace;

use crate::error::CodecError;
use crate::network::address::Address;
use crate::network::buffer::AddressBuffer;
use crate::network::endpoint::Endpoint;
use crate::network::family::{AddressFamily, IPV4_BUFFER_SIZE};

const PORT_OFFSET: usize = 2;
const ADDRESS_OFFSET: usize = 4;

pub fn serialize(endpoint: &Endpoint) -> Result<AddressBuffer, CodecError> {
    let family = endpoint.family();
    if family != AddressFamily::InterNetwork {
        return Err(CodecError::UnsupportedFamily(family.code()));
    }

    let mut buffer = AddressBuffer::new(family);
    let [port_hi, port_lo] = endpoint.port.to_be_bytes();
    buffer.set(PORT_OFFSET, port_hi);
    buffer.set(PORT_OFFSET + 1, port_lo);

    for (i, octet) in endpoint.address.octets().into_iter().enumerate() {
        buffer.set(ADDRESS_OFFSET + i, octet);
    }

    trace!("serialized {endpoint} into {} bytes", buffer.len());
    Ok(buffer)
}

pub fn deserialize(bytes: &[u8]) -> Result<Endpoint, CodecError> {
    if bytes.len() < IPV4_BUFFER_SIZE {
        return Err(CodecError::BufferTooShort {
            expected: IPV4_BUFFER_SIZE,
            actual: bytes.len(),
        });
    }

    let code = u16::from_le_bytes([bytes[0], bytes[1]]);
    if code != AddressFamily::InterNetwork.code() {
        return Err(CodecError::UnsupportedFamily(code));
    }

    let port = u16::from_be_bytes([bytes[PORT_OFFSET], bytes[PORT_OFFSET + 1]]);
    let address = Address::from_octets([
        bytes[ADDRESS_OFFSET],
        bytes[ADDRESS_OFFSET + 1],
        bytes[ADDRESS_OFFSET + 2],
        bytes[ADDRESS_OFFSET + 3],
    ]);

    Ok(Endpoint::new(address, port))
}

/// Copy taken right before an address is handed to bind/connect.
pub fn snapshot(address: &Address) -> Result<Address, CodecError> {
    address.snapshot()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn serialize_worked_example() {
        let ep = Endpoint::new(Address::from_octets([192, 168, 1, 1]), 6501);
        let buffer = serialize(&ep).unwrap();
        let bytes = buffer.as_bytes();

        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..2], &[0x02, 0x00]);
        assert_eq!(&bytes[2..4], &[0x19, 0x65]);
        assert_eq!(&bytes[4..8], &[192, 168, 1, 1]);
        assert!(bytes[8..].iter().all(|b| *b == 0));

        assert_eq!(deserialize(bytes), Ok(ep));
    }

    #[test]
    fn round_trip_random_endpoints() {
        let mut rng = rand::rng();
        for _ in 0..256 {
            let ep = Endpoint::new(Address::new(rng.random()), rng.random());
            let buffer = serialize(&ep).unwrap();
            assert_eq!(deserialize(buffer.as_bytes()), Ok(ep), "round trip of {ep}");
        }
    }

    #[test]
    fn round_trip_edges() {
        for ep in [
            Endpoint::new(Address::ANY, Endpoint::MIN_PORT),
            Endpoint::new(Address::BROADCAST, Endpoint::MAX_PORT),
            Endpoint::new(Address::LOOPBACK, 1),
        ] {
            let buffer = serialize(&ep).unwrap();
            assert_eq!(deserialize(buffer.as_bytes()), Ok(ep));
        }
    }

    #[test]
    fn deserialize_rejects_short_buffer() {
        let bytes = [0x02, 0x00, 0x19, 0x65, 192, 168, 1, 1];
        assert_eq!(
            deserialize(&bytes),
            Err(CodecError::BufferTooShort {
                expected: 16,
                actual: 8
            })
        );
        assert!(deserialize(&[]).is_err());
    }

    #[test]
    fn deserialize_rejects_other_families() {
        let mut bytes = [0u8; 16];
        bytes[0] = 23;
        assert_eq!(deserialize(&bytes), Err(CodecError::UnsupportedFamily(23)));

        bytes[0] = 0;
        bytes[1] = 1;
        assert_eq!(deserialize(&bytes), Err(CodecError::UnsupportedFamily(256)));
    }

    #[test]
    fn deserialize_ignores_reserved_tail() {
        let ep = Endpoint::new(Address::LOOPBACK, 443);
        let mut bytes = serialize(&ep).unwrap().into_bytes();
        bytes[12] = 0xEE;
        bytes.push(0xFF);
        assert_eq!(deserialize(&bytes), Ok(ep));
    }

    #[test]
    fn serialize_rejects_foreign_family() {
        let ep = Endpoint::new(Address::with_family(AddressFamily::InterNetworkV6, 0), 80);
        assert_eq!(serialize(&ep), Err(CodecError::UnsupportedFamily(23)));
    }

    #[test]
    fn equal_endpoints_hash_equally() {
        let a = serialize(&"10.0.0.1:80".parse().unwrap()).unwrap();
        let b = serialize(&"10.0.0.1:80".parse().unwrap()).unwrap();
        let c = serialize(&"10.0.0.1:81".parse().unwrap()).unwrap();
        assert_eq!(a.fold_hash(), b.fold_hash());
        assert_ne!(a.fold_hash(), c.fold_hash());
    }

    #[test]
    fn snapshot_copies_ipv4_only() {
        assert_eq!(snapshot(&Address::LOOPBACK), Ok(Address::LOOPBACK));
        let v6 = Address::with_family(AddressFamily::InterNetworkV6, 0);
        assert!(snapshot(&v6).is_err());
    }
}
