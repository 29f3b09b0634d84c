use netready_common::network::{Address, AddressBuffer, AddressFamily, Endpoint, codec};
use netready_common::CodecError;

#[test]
fn loopback_endpoint_layout() -> anyhow::Result<()> {
    let endpoint = Endpoint::new(Address::LOOPBACK, 6501);
    let buffer = codec::serialize(&endpoint)?;

    assert_eq!(
        buffer.as_bytes(),
        &[0x02, 0x00, 0x19, 0x65, 127, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(codec::deserialize(buffer.as_bytes())?, endpoint);
    Ok(())
}

#[test]
fn parsed_endpoint_survives_the_wire() -> anyhow::Result<()> {
    let endpoint: Endpoint = "192.168.0.100:8080".parse()?;
    let bytes = endpoint.serialize()?.into_bytes();

    let restored = Endpoint::create(&AddressBuffer::from_bytes(bytes))?;
    assert_eq!(restored.to_string(), "192.168.0.100:8080");
    assert_eq!(restored.family(), AddressFamily::InterNetwork);
    Ok(())
}

#[test]
fn truncated_and_foreign_buffers_are_rejected() {
    assert!(matches!(
        codec::deserialize(&[0x02, 0x00, 0x19]),
        Err(CodecError::BufferTooShort { .. })
    ));

    let mut ipv6 = vec![0u8; 28];
    ipv6[0] = 23;
    assert_eq!(codec::deserialize(&ipv6), Err(CodecError::UnsupportedFamily(23)));
}

#[test]
fn equal_endpoints_hash_equal() -> anyhow::Result<()> {
    let a = Endpoint::new(Address::from_octets([10, 0, 0, 1]), 53).serialize()?;
    let b = Endpoint::new(Address::from_octets([10, 0, 0, 1]), 53).serialize()?;
    let c = Endpoint::new(Address::from_octets([10, 0, 0, 1]), 54).serialize()?;

    assert_eq!(a.fold_hash(), b.fold_hash());
    assert_ne!(a.fold_hash(), c.fold_hash());
    Ok(())
}
