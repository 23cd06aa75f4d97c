//! Peer-originated events: attribute writes and link changes coming
//! from the BLE stack's event context.

use crate::attributes::{AttributeKind, AttributeTable};
use crate::error::Error;
use crate::gate::NotificationGate;

/// CCCD value enabling notifications.
const CCCD_NOTIFY: u16 = 0x0001;

/// CCCD value disabling notifications and indications.
const CCCD_DISABLED: u16 = 0x0000;

/// Events the BLE context delivers to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerEvent {
    /// The peer wrote the PM client configuration descriptor.
    NotificationsChanged(bool),
    /// The peer wrote the request characteristic.
    Request(u8),
    /// The link dropped.
    Disconnected,
}

/// Decode a peer write into an event.
///
/// Returns `Ok(None)` for writes the core does not act on (malformed
/// CCCD values, indication requests, empty request writes).
pub fn decode_write(
    table: &AttributeTable,
    handle: u16,
    data: &[u8],
) -> Result<Option<PeerEvent>, Error> {
    let kind = table.kind_of(handle).ok_or(Error::UnknownAttribute(handle))?;

    match kind {
        AttributeKind::PmClientConfig => {
            let [lo, hi] = data else {
                warn!("CCCD write with {} bytes ignored", data.len());
                return Ok(None);
            };
            match u16::from_le_bytes([*lo, *hi]) {
                CCCD_NOTIFY => Ok(Some(PeerEvent::NotificationsChanged(true))),
                CCCD_DISABLED => Ok(Some(PeerEvent::NotificationsChanged(false))),
                other => {
                    warn!("Unsupported CCCD value {:#x}", other);
                    Ok(None)
                }
            }
        }
        AttributeKind::RequestValue => Ok(data.first().map(|b| PeerEvent::Request(*b))),
        _ => {
            debug!("Write to read-only handle {} ignored", handle);
            Ok(None)
        }
    }
}

/// Apply a peer event to the core's shared state.
///
/// Only descriptor writes touch the gate; a disconnect leaves it as the
/// peer last set it.
pub fn apply(event: PeerEvent, gate: &NotificationGate) {
    match event {
        PeerEvent::NotificationsChanged(enabled) => {
            gate.set(enabled);
            info!("PM notifications {}", if enabled { "enabled" } else { "disabled" });
        }
        PeerEvent::Request(code) => {
            info!("Request characteristic written: {:#x}", code);
        }
        PeerEvent::Disconnected => {
            debug!("Peer disconnected");
        }
    }
}
