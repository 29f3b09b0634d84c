//! Socket option identifiers and their typed values.
//!
//! Option values cross the socket boundary as byte sequences. [`SocketOptionValue`]
//! keeps them typed until that boundary: booleans and integers travel as 4-byte
//! little-endian words, everything else verbatim.

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SocketOptionLevel {
    IP = 0,
    Tcp = 6,
    Udp = 17,
    Socket = 0xFFFF,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketOptionName {
    Debug,
    AcceptConnection,
    ReuseAddress,
    KeepAlive,
    DontRoute,
    Broadcast,
    Linger,
    DontLinger,
    OutOfBandInline,
    SendBuffer,
    ReceiveBuffer,
    SendTimeout,
    ReceiveTimeout,
    Error,
    Type,
    IpTimeToLive,
    MulticastInterface,
    MulticastTimeToLive,
    AddMembership,
    DropMembership,
    NoDelay,
}

/// Shape of the value an option carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int32,
    Bytes,
}

impl SocketOptionName {
    /// BSD option code. Codes are only unique within a [`SocketOptionLevel`].
    pub const fn code(self) -> i32 {
        use SocketOptionName::*;
        match self {
            Debug => 0x0001,
            AcceptConnection => 0x0002,
            ReuseAddress => 0x0004,
            KeepAlive => 0x0008,
            DontRoute => 0x0010,
            Broadcast => 0x0020,
            Linger => 0x0080,
            DontLinger => !0x0080,
            OutOfBandInline => 0x0100,
            SendBuffer => 0x1001,
            ReceiveBuffer => 0x1002,
            SendTimeout => 0x1005,
            ReceiveTimeout => 0x1006,
            Error => 0x1007,
            Type => 0x1008,
            IpTimeToLive => 4,
            MulticastInterface => 9,
            MulticastTimeToLive => 10,
            AddMembership => 12,
            DropMembership => 13,
            NoDelay => 1,
        }
    }

    pub const fn level(self) -> SocketOptionLevel {
        use SocketOptionName::*;
        match self {
            IpTimeToLive | MulticastInterface | MulticastTimeToLive | AddMembership
            | DropMembership => SocketOptionLevel::IP,
            NoDelay => SocketOptionLevel::Tcp,
            _ => SocketOptionLevel::Socket,
        }
    }

    pub const fn kind(self) -> OptionKind {
        use SocketOptionName::*;
        match self {
            Debug | AcceptConnection | ReuseAddress | KeepAlive | DontRoute | Broadcast
            | DontLinger | OutOfBandInline | NoDelay => OptionKind::Bool,
            SendBuffer | ReceiveBuffer | SendTimeout | ReceiveTimeout | Error | Type
            | IpTimeToLive | MulticastTimeToLive => OptionKind::Int32,
            Linger | MulticastInterface | AddMembership | DropMembership => OptionKind::Bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketOptionValue {
    Bool(bool),
    Int32(i32),
    Bytes(Vec<u8>),
}

impl SocketOptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            SocketOptionValue::Bool(_) => OptionKind::Bool,
            SocketOptionValue::Int32(_) => OptionKind::Int32,
            SocketOptionValue::Bytes(_) => OptionKind::Bytes,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            SocketOptionValue::Bool(flag) => i32::from(*flag).to_le_bytes().to_vec(),
            SocketOptionValue::Int32(value) => value.to_le_bytes().to_vec(),
            SocketOptionValue::Bytes(bytes) => bytes.clone(),
        }
    }

    /// Decodes bytes returned for `name`, using the option's expected shape.
    pub fn decode(name: SocketOptionName, bytes: &[u8]) -> Result<Self, CodecError> {
        let word = || -> Result<i32, CodecError> {
            match bytes {
                [a, b, c, d, ..] => Ok(i32::from_le_bytes([*a, *b, *c, *d])),
                _ => Err(CodecError::BufferTooShort {
                    expected: 4,
                    actual: bytes.len(),
                }),
            }
        };

        match name.kind() {
            OptionKind::Bool => Ok(SocketOptionValue::Bool(word()? != 0)),
            OptionKind::Int32 => Ok(SocketOptionValue::Int32(word()?)),
            OptionKind::Bytes => Ok(SocketOptionValue::Bytes(bytes.to_vec())),
        }
    }
}

impl From<bool> for SocketOptionValue {
    fn from(flag: bool) -> Self {
        SocketOptionValue::Bool(flag)
    }
}

impl From<i32> for SocketOptionValue {
    fn from(value: i32) -> Self {
        SocketOptionValue::Int32(value)
    }
}

impl From<Vec<u8>> for SocketOptionValue {
    fn from(bytes: Vec<u8>) -> Self {
        SocketOptionValue::Bytes(bytes)
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
