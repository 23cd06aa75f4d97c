//! Telemetry core for the AirU air-quality node.
//!
//! Everything here is pure logic that runs on the host: the telemetry
//! cycle and its cadence, the notification gate and publisher, the
//! attribute table, the packet formatter and the sensor decoders.
//!
//! Usage: `cargo test --lib` (unit tests) or `cargo test` (unit +
//! integration tests).
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and supplies the SoftDevice transport, sensor peripherals and clocks
//! through the traits defined here.

#![cfg_attr(not(test), no_std)]

// This must go first so the macros are visible to every other module.
#[macro_use]
mod fmt;

pub mod attributes;
pub mod config;
pub mod error;
pub mod formatter;
pub mod gate;
pub mod identity;
pub mod peer;
pub mod publisher;
pub mod record;
pub mod scheduler;
pub mod sensors;
pub mod watchdog;

pub use attributes::AttributeTable;
pub use error::{Error, FrameError, SensorFault, TransportError};
pub use formatter::{format, Packet};
pub use gate::NotificationGate;
pub use identity::{format_address, DeviceIdentity};
pub use peer::PeerEvent;
pub use publisher::{NotificationPublisher, NotifyTransport, Publish};
pub use record::{aggregate, ClimateReading, PmReading, TelemetryRecord};
pub use scheduler::{Cadence, CycleReport, CyclePhase, LogUplink, Monotonic, TelemetryCycle, Uplink};
pub use watchdog::{Restart, Watchdog, WatchdogState};
