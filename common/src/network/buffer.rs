//! # Address Buffer
//!
//! The raw byte form handed to bind/connect/send-to/receive-from.
//!
//! The first two bytes hold the address family, low byte first. Everything
//! after that is family specific; for IPv4 see [`codec`](super::codec).

use std::hash::{Hash, Hasher};

use crate::error::CodecError;
use crate::network::family::AddressFamily;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBuffer {
    bytes: Vec<u8>,
}

impl AddressBuffer {
    /// Allocates a zeroed buffer of the family's fixed size with the tag written.
    pub fn new(family: AddressFamily) -> Self {
        Self::with_size(family, family.buffer_size())
    }

    /// Allocates a zeroed buffer of an explicit size.
    ///
    /// Sizes below two bytes are widened so the family tag always fits.
    pub fn with_size(family: AddressFamily, size: usize) -> Self {
        let mut bytes = vec![0u8; size.max(2)];
        let code = family.code();
        bytes[0] = (code & 0xFF) as u8;
        bytes[1] = (code >> 8) as u8;
        Self { bytes }
    }

    /// Wraps bytes received from a socket primitive.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Raw family tag, or `None` when the buffer cannot even hold one.
    pub fn family_code(&self) -> Option<u16> {
        match self.bytes.as_slice() {
            [lo, hi, ..] => Some(u16::from(*lo) | (u16::from(*hi) << 8)),
            _ => None,
        }
    }

    pub fn family(&self) -> Result<AddressFamily, CodecError> {
        let code = self.family_code().ok_or(CodecError::BufferTooShort {
            expected: 2,
            actual: self.bytes.len(),
        })?;
        AddressFamily::try_from(code)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Indexed write used while the buffer is being built.
    ///
    /// Writes past the end are ignored; the layout is fixed at allocation.
    pub(crate) fn set(&mut self, offset: usize, value: u8) {
        if let Some(slot) = self.bytes.get_mut(offset) {
            *slot = value;
        }
    }

    /// XOR of the buffer read as little-endian 32-bit words.
    ///
    /// A trailing group of one to three bytes is packed the same way (first
    /// byte lowest) and folded in last. Peers that key tables by this value
    /// depend on the exact algorithm.
    pub fn fold_hash(&self) -> u32 {
        let mut chunks = self.bytes.chunks_exact(4);
        let mut hash = 0u32;

        for word in &mut chunks {
            hash ^= u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        }

        let tail = chunks.remainder();
        if !tail.is_empty() {
            let remnant = tail
                .iter()
                .enumerate()
                .fold(0u32, |acc, (i, byte)| acc | (u32::from(*byte) << (8 * i)));
            hash ^= remnant;
        }

        hash
    }
}

impl Hash for AddressBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.fold_hash());
    }
}

impl AsRef<[u8]> for AddressBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_buffer_carries_family_tag() {
        let buf = AddressBuffer::new(AddressFamily::InterNetwork);
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf.as_bytes()[..2], &[0x02, 0x00]);
        assert!(buf.as_bytes()[2..].iter().all(|b| *b == 0));
        assert_eq!(buf.family(), Ok(AddressFamily::InterNetwork));
    }

    #[test]
    fn family_of_truncated_buffer() {
        let buf = AddressBuffer::from_bytes(vec![0x02]);
        assert_eq!(buf.family_code(), None);
        assert_eq!(
            buf.family(),
            Err(CodecError::BufferTooShort {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn fold_hash_of_whole_words() {
        // 0x04030201 ^ 0x08070605
        let buf = AddressBuffer::from_bytes(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(buf.fold_hash(), 0x04030201 ^ 0x08070605);
    }

    #[test]
    fn fold_hash_with_tail_bytes() {
        let buf = AddressBuffer::from_bytes(vec![1, 2, 3, 4, 0xAA, 0xBB]);
        assert_eq!(buf.fold_hash(), 0x04030201 ^ 0x0000BBAA);

        let short = AddressBuffer::from_bytes(vec![0x10]);
        assert_eq!(short.fold_hash(), 0x10);
    }

    #[test]
    fn fold_hash_of_loopback_endpoint() {
        // family 2, port 80, 127.0.0.1, zero padding
        let mut bytes = vec![0u8; 16];
        bytes[0] = 2;
        bytes[3] = 80;
        bytes[4..8].copy_from_slice(&[127, 0, 0, 1]);
        let buf = AddressBuffer::from_bytes(bytes);
        assert_eq!(buf.fold_hash(), 0x5000_0002 ^ 0x0100_007F);
    }

    #[test]
    fn equality_requires_same_length_and_bytes() {
        let a = AddressBuffer::from_bytes(vec![2, 0, 1, 2]);
        let b = AddressBuffer::from_bytes(vec![2, 0, 1, 2]);
        let longer = AddressBuffer::from_bytes(vec![2, 0, 1, 2, 0]);
        let different = AddressBuffer::from_bytes(vec![2, 0, 1, 3]);

        assert_eq!(a, b);
        assert_eq!(a.fold_hash(), b.fold_hash());
        assert_ne!(a, longer);
        assert_ne!(a, different);
        assert_ne!(a.fold_hash(), different.fold_hash());
    }

    #[test]
    fn usable_as_set_key() {
        let mut set = HashSet::new();
        set.insert(AddressBuffer::from_bytes(vec![2, 0, 0, 80]));
        set.insert(AddressBuffer::from_bytes(vec![2, 0, 0, 80]));
        set.insert(AddressBuffer::from_bytes(vec![2, 0, 0, 81]));
        assert_eq!(set.len(), 2);
    }
}
