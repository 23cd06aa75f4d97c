//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Server** - registers the air-quality service and maps the
//!    handles the SoftDevice assigns onto the core's attribute table.
//! 2. **Advertiser** - advertises until a peer connects, then runs the
//!    GATT server on that link until it drops.
//! 3. **Notifier** - the [`NotifyTransport`](airu_node::NotifyTransport)
//!    the telemetry cycle pushes PM notifications through.
//!
//! Peer writes are turned into [`PeerEvent`]s inside the SoftDevice
//! event context and applied to the notification gate there.

pub mod server;

use core::cell::Cell;
use core::mem;

use airu_node::config::{BLE_ADV_INTERVAL, BLE_DEVICE_NAME};
use airu_node::{peer, NotificationGate, PeerEvent};
use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_softdevice::ble::{gatt_server, peripheral, TxPower};
use nrf_softdevice::{raw, Softdevice};

pub use server::{AirQualityServer, SoftdeviceNotifier};

#[rustfmt::skip]
const ADV_DATA: &[u8] = &[
    0x02, 0x01, raw::BLE_GAP_ADV_FLAGS_LE_ONLY_GENERAL_DISC_MODE as u8,
    0x03, 0x03, 0xFF, 0x00,
    0x05, 0x09, b'A', b'i', b'r', b'U',
];

#[rustfmt::skip]
const SCAN_DATA: &[u8] = &[
    0x03, 0x03, 0xFF, 0x00,
];

/// Handle of the connected peer, if any. Written by the advertiser,
/// read by the notifier.
pub struct ConnectionSlot {
    handle: Mutex<CriticalSectionRawMutex, Cell<Option<u16>>>,
}

impl ConnectionSlot {
    pub const fn new() -> Self {
        Self {
            handle: Mutex::new(Cell::new(None)),
        }
    }

    fn set(&self, handle: Option<u16>) {
        self.handle.lock(|h| h.set(handle));
    }

    pub fn get(&self) -> Option<u16> {
        self.handle.lock(|h| h.get())
    }
}

pub static CONNECTION: ConnectionSlot = ConnectionSlot::new();

/// Bring up the SoftDevice for a single peripheral link.
pub fn enable_softdevice() -> &'static mut Softdevice {
    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 64 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT.into(),
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    Softdevice::enable(&config)
}

/// Run the SoftDevice event loop - must be spawned as a dedicated task.
#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Advertise, serve one peer until it disconnects, repeat.
#[embassy_executor::task]
pub async fn peripheral_task(
    sd: &'static Softdevice,
    server: &'static AirQualityServer,
    gate: &'static NotificationGate,
) -> ! {
    loop {
        let config = peripheral::Config {
            interval: BLE_ADV_INTERVAL,
            tx_power: TxPower::ZerodBm,
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: ADV_DATA,
            scan_data: SCAN_DATA,
        };

        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising failed: {:?}", e);
                continue;
            }
        };

        info!("Peer connected");
        CONNECTION.set(conn.handle());

        // Returns when the link drops.
        let reason = gatt_server::run(&conn, server, |event| peer::apply(event, gate)).await;

        CONNECTION.set(None);
        peer::apply(PeerEvent::Disconnected, gate);
        info!("Link closed: {:?}", reason);
    }
}
