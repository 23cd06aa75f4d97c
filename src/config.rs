//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, wire-format constants, and GATT identifiers
//! live here so they can be tuned in one place. Nothing in here is
//! reconfigurable at runtime.

// Scheduling

/// Period of the telemetry cycle (ms). Each cycle samples both sensors,
/// notifies the BLE peer and renders one upload packet.
pub const TELEMETRY_PERIOD_MS: u64 = 10_000;

/// Watchdog period (ms). The node restarts unconditionally once this
/// much time has elapsed since boot.
pub const WATCHDOG_PERIOD_MS: u64 = 60 * 60 * 1000;

// Upload packet

/// Upper bound on the rendered packet, in bytes.
pub const MAX_PACKET_LEN: usize = 256;

/// Line-protocol measurement name.
pub const MEASUREMENT_NAME: &str = "airQuality";

/// Prefix of the `SensorModel` tag; the firmware version follows it.
pub const SENSOR_MODEL_PREFIX: &str = "H2+";

/// Value carried by a record field whose sensor poll failed.
pub const SENSOR_FAULT_SENTINEL: f32 = -999.0;

// Identity

/// Length of a formatted hardware address (`AA:BB:CC:DD:EE:FF`).
pub const DEVICE_ID_LEN: usize = 17;

/// Longest firmware version string we carry.
pub const FIRMWARE_VERSION_MAX_LEN: usize = 32;

// BLE

/// Size of the PM notification payload: three little-endian `f32`.
pub const PM_PAYLOAD_LEN: usize = 12;

/// Primary service UUID (16-bit).
pub const AIR_QUALITY_SERVICE_UUID: u16 = 0x00FF;

/// PM characteristic (read + notify).
pub const PM_CHAR_UUID: u16 = 0xFF01;

/// Secondary informational characteristic (read).
pub const INFO_CHAR_UUID: u16 = 0xFF02;

/// Request characteristic (write only).
pub const REQUEST_CHAR_UUID: u16 = 0xFF03;

/// Device address characteristic (read).
pub const ADDRESS_CHAR_UUID: u16 = 0xFF04;

/// Advertised device name.
pub const BLE_DEVICE_NAME: &str = "AirU";

/// Advertising interval (in 0.625 ms units). 1600 = 1 s.
pub const BLE_ADV_INTERVAL: u32 = 1600;

// Sensors
//
// Pin assignments (nRF52840-DK defaults). The concrete
// `embassy_nrf::peripherals::*` types are selected in `main.rs`.
//
//   PMS5003 TX  → P0.08 (UARTE0 RX)
//   PMS5003 RX  → P0.06 (UARTE0 TX)
//   HDC1080 SDA → P0.26
//   HDC1080 SCL → P0.27

/// PMS5003 frame length in bytes. The part streams at a fixed 9600 baud.
pub const PMS_FRAME_LEN: usize = 32;

/// HDC1080 fixed I²C address.
pub const HDC1080_ADDRESS: u8 = 0x40;

/// Conversion time for a combined 14-bit temperature + humidity
/// acquisition (ms), with margin over the datasheet's 12.85 ms.
pub const HDC1080_CONVERSION_MS: u32 = 20;

/// Longest a PM poll may take (ms). The part emits a frame every
/// 200-2300 ms depending on how fast concentrations move.
pub const PMS_POLL_TIMEOUT_MS: u64 = 3_000;

/// Longest a climate poll may take (ms): one conversion plus bus time.
pub const HDC1080_POLL_TIMEOUT_MS: u64 = 100;
