//! BLE notification publisher.
//!
//! Pushes the PM part of a [`TelemetryRecord`] to the peer when the
//! [`NotificationGate`] is open.
//!
//! Payload layout (12 bytes):
//! ```text
//! Bytes 0..4:  PM1   (f32, little-endian)
//! Bytes 4..8:  PM2.5 (f32, little-endian)
//! Bytes 8..12: PM10  (f32, little-endian)
//! ```

use crate::attributes::AttributeTable;
use crate::config::PM_PAYLOAD_LEN;
use crate::error::{Error, TransportError};
use crate::gate::NotificationGate;
use crate::record::{PmReading, TelemetryRecord};

/// Outbound notification path of the BLE stack.
pub trait NotifyTransport {
    /// Submit one notification frame for the attribute at `handle`.
    fn notify(&mut self, handle: u16, payload: &[u8]) -> Result<(), TransportError>;
}

impl<T: NotifyTransport + ?Sized> NotifyTransport for &mut T {
    fn notify(&mut self, handle: u16, payload: &[u8]) -> Result<(), TransportError> {
        (**self).notify(handle, payload)
    }
}

/// Outcome of a successful publish call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Publish {
    /// One frame was handed to the transport.
    Sent,
    /// The gate was closed; the transport was not touched.
    Skipped,
}

/// Encode PM readings into the fixed notification payload.
pub fn encode_pm(pm: &PmReading) -> [u8; PM_PAYLOAD_LEN] {
    let mut buf = [0u8; PM_PAYLOAD_LEN];
    buf[0..4].copy_from_slice(&pm.pm1.to_le_bytes());
    buf[4..8].copy_from_slice(&pm.pm2_5.to_le_bytes());
    buf[8..12].copy_from_slice(&pm.pm10.to_le_bytes());
    buf
}

/// Decode a notification payload. Returns `None` if it is too short.
pub fn decode_pm(data: &[u8]) -> Option<PmReading> {
    if data.len() < PM_PAYLOAD_LEN {
        return None;
    }
    let word = |i: usize| f32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
    Some(PmReading {
        pm1: word(0),
        pm2_5: word(4),
        pm10: word(8),
    })
}

/// Sends PM notifications addressed at the table's PM value handle.
pub struct NotificationPublisher<'a, T> {
    transport: T,
    table: &'a AttributeTable,
}

impl<'a, T: NotifyTransport> NotificationPublisher<'a, T> {
    pub fn new(transport: T, table: &'a AttributeTable) -> Self {
        Self { transport, table }
    }

    /// Notify the peer with `record`'s PM fields if the gate is open.
    ///
    /// A transport failure is returned to the caller; it never panics,
    /// including when no peer is connected.
    pub fn publish(
        &mut self,
        record: &TelemetryRecord<'_>,
        gate: &NotificationGate,
    ) -> Result<Publish, Error> {
        if !gate.get() {
            return Ok(Publish::Skipped);
        }

        let payload = encode_pm(&record.pm());
        self.transport
            .notify(self.table.pm_value_handle(), &payload)?;
        trace!("PM notification sent");
        Ok(Publish::Sent)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
