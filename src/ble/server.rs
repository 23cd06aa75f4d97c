//! Air-quality GATT service.
//!
//! Registered through the SoftDevice service builder rather than the
//! `gatt_server` derive macros: the core needs every handle, including
//! the declarations, to fill its attribute table.

use airu_node::config::{
    ADDRESS_CHAR_UUID, AIR_QUALITY_SERVICE_UUID, INFO_CHAR_UUID, PM_CHAR_UUID, PM_PAYLOAD_LEN,
    REQUEST_CHAR_UUID,
};
use airu_node::{peer, AttributeTable, DeviceIdentity, NotifyTransport, PeerEvent, TransportError};
use defmt::{debug, warn};
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{
    self, NotifyValueError, RegisterError, SetValueError, WriteOp,
};
use nrf_softdevice::ble::{Connection, Uuid};
use nrf_softdevice::{RawError, Softdevice};

use super::ConnectionSlot;

pub struct AirQualityServer {
    table: AttributeTable,
}

impl AirQualityServer {
    /// Register the service. Must run before the SoftDevice task starts.
    pub fn register(sd: &mut Softdevice, identity: &DeviceIdentity) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, Uuid::new_16(AIR_QUALITY_SERVICE_UUID))?;

        let pm = service
            .add_characteristic(
                Uuid::new_16(PM_CHAR_UUID),
                Attribute::new(&[0u8; PM_PAYLOAD_LEN]),
                Metadata::new(Properties::new().read().notify()),
            )?
            .build();

        let info = service
            .add_characteristic(
                Uuid::new_16(INFO_CHAR_UUID),
                Attribute::new(identity.firmware_version().as_bytes()),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        let request = service
            .add_characteristic(
                Uuid::new_16(REQUEST_CHAR_UUID),
                Attribute::new(&[0u8]),
                Metadata::new(Properties::new().write()),
            )?
            .build();

        let address = service
            .add_characteristic(
                Uuid::new_16(ADDRESS_CHAR_UUID),
                Attribute::new(identity.address().as_bytes()),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        let registered = service.build();

        // Each characteristic declaration sits directly before its value.
        let table = AttributeTable::new([
            registered.handle(),
            pm.value_handle - 1,
            pm.value_handle,
            pm.cccd_handle,
            info.value_handle - 1,
            info.value_handle,
            request.value_handle - 1,
            request.value_handle,
            address.value_handle - 1,
            address.value_handle,
        ]);

        debug!(
            "Air-quality service registered, PM value handle {}",
            table.pm_value_handle()
        );

        Ok(Self { table })
    }

    pub fn table(&self) -> &AttributeTable {
        &self.table
    }
}

impl gatt_server::Server for AirQualityServer {
    type Event = PeerEvent;

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        match peer::decode_write(&self.table, handle, data) {
            Ok(event) => event,
            Err(e) => {
                warn!("Write rejected: {}", e);
                None
            }
        }
    }
}

/// Stores the PM value in the attribute table and notifies whichever
/// peer currently holds the link.
pub struct SoftdeviceNotifier {
    sd: &'static Softdevice,
    slot: &'static ConnectionSlot,
}

impl SoftdeviceNotifier {
    pub fn new(sd: &'static Softdevice, slot: &'static ConnectionSlot) -> Self {
        Self { sd, slot }
    }
}

impl NotifyTransport for SoftdeviceNotifier {
    fn notify(&mut self, handle: u16, payload: &[u8]) -> Result<(), TransportError> {
        // Keep the stored value current for GATT reads.
        gatt_server::set_value(self.sd, handle, payload).map_err(|e| match e {
            SetValueError::Raw(raw) => TransportError::Raw(raw as u32),
        })?;

        let conn = self
            .slot
            .get()
            .and_then(Connection::from_handle)
            .ok_or(TransportError::NoPeer)?;

        gatt_server::notify_value(&conn, handle, payload).map_err(|e| match e {
            NotifyValueError::Disconnected => TransportError::NoPeer,
            NotifyValueError::Raw(RawError::Resources) => TransportError::BufferFull,
            NotifyValueError::Raw(raw) => TransportError::Raw(raw as u32),
        })
    }
}
