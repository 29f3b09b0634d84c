pub mod address;
pub mod buffer;
pub mod codec;
pub mod endpoint;
pub mod family;
pub mod interface;
pub mod ip_config;
pub mod options;

pub use address::Address;
pub use buffer::AddressBuffer;
pub use endpoint::Endpoint;
pub use family::AddressFamily;
pub use interface::{AddressChange, InterfaceState, InterfaceType};
pub use ip_config::IpConfiguration;
