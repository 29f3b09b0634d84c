//! Berkeley-sockets address families and the socket kind enumerations that
//! travel alongside them.

use crate::error::CodecError;

/// Address family tag written into the first two bytes of every
/// [`AddressBuffer`](super::AddressBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum AddressFamily {
    Unspecified = 0,
    Unix = 1,
    /// IPv4. The only family the codec encodes.
    InterNetwork = 2,
    ImpLink = 3,
    Pup = 4,
    Chaos = 5,
    Ipx = 6,
    Iso = 7,
    Ecma = 8,
    DataKit = 9,
    Ccitt = 10,
    Sna = 11,
    DecNet = 12,
    DataLink = 13,
    Lat = 14,
    HyperChannel = 15,
    AppleTalk = 16,
    NetBios = 17,
    VoiceView = 18,
    FireFox = 19,
    Banyan = 21,
    Atm = 22,
    InterNetworkV6 = 23,
    Cluster = 24,
    Ieee12844 = 25,
    Irda = 26,
    NetworkDesigners = 28,
}

/// Fixed size of an IPv4 address buffer.
pub const IPV4_BUFFER_SIZE: usize = 16;
/// Fixed size of an IPv6 address buffer. Only used for sizing; IPv6 is not encoded.
pub const IPV6_BUFFER_SIZE: usize = 28;

impl AddressFamily {
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Size of the buffer a socket primitive expects for this family.
    pub const fn buffer_size(self) -> usize {
        match self {
            AddressFamily::InterNetworkV6 => IPV6_BUFFER_SIZE,
            _ => IPV4_BUFFER_SIZE,
        }
    }
}

impl TryFrom<u16> for AddressFamily {
    type Error = CodecError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        use AddressFamily::*;
        let family = match code {
            0 => Unspecified,
            1 => Unix,
            2 => InterNetwork,
            3 => ImpLink,
            4 => Pup,
            5 => Chaos,
            6 => Ipx,
            7 => Iso,
            8 => Ecma,
            9 => DataKit,
            10 => Ccitt,
            11 => Sna,
            12 => DecNet,
            13 => DataLink,
            14 => Lat,
            15 => HyperChannel,
            16 => AppleTalk,
            17 => NetBios,
            18 => VoiceView,
            19 => FireFox,
            21 => Banyan,
            22 => Atm,
            23 => InterNetworkV6,
            24 => Cluster,
            25 => Ieee12844,
            26 => Irda,
            28 => NetworkDesigners,
            other => return Err(CodecError::UnsupportedFamily(other)),
        };
        Ok(family)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SocketType {
    Stream = 1,
    Dgram = 2,
    Raw = 3,
    Rdm = 4,
    Seqpacket = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ProtocolType {
    IP = 0,
    Icmp = 1,
    Igmp = 2,
    Tcp = 6,
    Udp = 17,
    Raw = 255,
}

impl SocketType {
    /// The protocol a socket of this type uses when none is given.
    pub const fn default_protocol(self) -> ProtocolType {
        match self {
            SocketType::Stream => ProtocolType::Tcp,
            SocketType::Dgram => ProtocolType::Udp,
            _ => ProtocolType::Raw,
        }
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
