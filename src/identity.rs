//! Device identity: hardware address and running firmware version.
//!
//! Both are supplied once at boot and never change for the lifetime of
//! the process.

use core::fmt::Write;

use heapless::String;

use crate::config::{DEVICE_ID_LEN, FIRMWARE_VERSION_MAX_LEN};
use crate::error::Error;

/// Stable identity of this node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    address: String<DEVICE_ID_LEN>,
    firmware_version: String<FIRMWARE_VERSION_MAX_LEN>,
}

impl DeviceIdentity {
    /// Build an identity, rejecting empty or oversized fields.
    pub fn new(address: &str, firmware_version: &str) -> Result<Self, Error> {
        if address.is_empty() || firmware_version.is_empty() {
            return Err(Error::InvalidIdentity);
        }

        Ok(Self {
            address: String::try_from(address).map_err(|_| Error::InvalidIdentity)?,
            firmware_version: String::try_from(firmware_version)
                .map_err(|_| Error::InvalidIdentity)?,
        })
    }

    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    pub fn firmware_version(&self) -> &str {
        self.firmware_version.as_str()
    }
}

/// Render a BLE address as `AA:BB:CC:DD:EE:FF`.
///
/// The stack hands out addresses least-significant byte first; the
/// rendered form starts with the most significant byte.
pub fn format_address(bytes: [u8; 6]) -> String<DEVICE_ID_LEN> {
    let mut out = String::new();
    for (i, b) in bytes.iter().rev().enumerate() {
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = write!(out, "{:02X}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_accepts_address_and_version() {
        let id = DeviceIdentity::new("AA:BB:CC:DD:EE:FF", "1.2.0").unwrap();
        assert_eq!(id.address(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(id.firmware_version(), "1.2.0");
    }

    #[test]
    fn identity_rejects_empty_fields() {
        assert_eq!(DeviceIdentity::new("", "1.2.0"), Err(Error::InvalidIdentity));
        assert_eq!(
            DeviceIdentity::new("AA:BB:CC:DD:EE:FF", ""),
            Err(Error::InvalidIdentity)
        );
    }

    #[test]
    fn identity_rejects_oversized_address() {
        assert_eq!(
            DeviceIdentity::new("AA:BB:CC:DD:EE:FF:00", "1.2.0"),
            Err(Error::InvalidIdentity)
        );
    }

    #[test]
    fn address_is_rendered_most_significant_first() {
        let bytes = [0xFF, 0xEE, 0xDD, 0xCC, 0xBB, 0xAA];
        assert_eq!(format_address(bytes).as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn address_keeps_leading_zeros() {
        let bytes = [0x01, 0x00, 0x0A, 0x00, 0x00, 0xC0];
        assert_eq!(format_address(bytes).as_str(), "C0:00:00:0A:00:01");
    }
}
