//! Telemetry cycle orchestration.
//!
//! One cycle runs, in order:
//! ```text
//! Idle → Sampling → Aggregating → Notifying → Formatting → Idle
//! ```
//! and is re-triggered every [`TELEMETRY_PERIOD_MS`]. A failure in any
//! phase is confined to the current cycle: the cycle still returns to
//! `Idle` and the next trigger fires on schedule.
//!
//! Phases run strictly in sequence within a cycle. Sensor polls and the
//! wait for the next trigger are async, so the executor running the
//! cycle keeps serving other tasks (the BLE event loop on target) while
//! a sensor transaction is in flight.

use embedded_hal_async::delay::DelayNs;

use crate::config::TELEMETRY_PERIOD_MS;
use crate::error::{Error, SensorFault};
use crate::formatter::{self, Packet};
use crate::gate::NotificationGate;
use crate::identity::DeviceIdentity;
use crate::publisher::{NotificationPublisher, NotifyTransport, Publish};
use crate::record::{aggregate, ClimateReading, PmReading};
use crate::sensors::{ClimateSensor, ParticulateSensor};


/// Monotonic millisecond clock, starting at boot.
pub trait Monotonic {
    fn now_ms(&self) -> u64;
}

impl<M: Monotonic + ?Sized> Monotonic for &M {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Receives rendered packets. Ownership of the packet passes to the
/// uplink; whatever it does next is outside the cycle.
pub trait Uplink {
    fn hand_off(&mut self, packet: Packet);
}

impl<U: Uplink + ?Sized> Uplink for &mut U {
    fn hand_off(&mut self, packet: Packet) {
        (**self).hand_off(packet)
    }
}

/// Uplink that only logs the packet. Used until a network transport is
/// attached.
#[derive(Debug, Default)]
pub struct LogUplink {
    handed_off: u32,
}

impl LogUplink {
    pub const fn new() -> Self {
        Self { handed_off: 0 }
    }

    /// Packets received so far.
    pub fn handed_off(&self) -> u32 {
        self.handed_off
    }
}

impl Uplink for LogUplink {
    fn hand_off(&mut self, packet: Packet) {
        self.handed_off = self.handed_off.wrapping_add(1);
        info!("{}", packet);
    }
}

/// Fixed-period trigger schedule.
///
/// Cycles are due at `start + k * period`. When a cycle finishes after
/// its successor's trigger time, the successor runs immediately and the
/// schedule re-anchors at that instant: the trigger is delayed, never
/// skipped, and late cycles are not replayed in a burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cadence {
    period_ms: u64,
    deadline_ms: u64,
    overruns: u32,
}

impl Cadence {
    /// A schedule whose first cycle is due at `start_ms`.
    pub const fn new(period_ms: u64, start_ms: u64) -> Self {
        Self {
            period_ms,
            deadline_ms: start_ms,
            overruns: 0,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// When the next cycle is due.
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Time left until the next cycle; zero once due.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }

    /// Record that the cycle due at [`Self::deadline_ms`] finished at
    /// `now_ms`, and advance to the next trigger.
    pub fn complete(&mut self, now_ms: u64) {
        let next = self.deadline_ms.saturating_add(self.period_ms);
        if now_ms >= next {
            self.overruns = self.overruns.saturating_add(1);
            warn!("Telemetry cycle overran its period by {} ms", now_ms - next);
            self.deadline_ms = now_ms;
        } else {
            self.deadline_ms = next;
        }
    }

    /// Number of cycles that finished past their successor's trigger.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

/// Where the telemetry cycle currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePhase {
    Idle,
    Sampling,
    Aggregating,
    Notifying,
    Formatting,
}

/// Per-phase outcome of one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub uptime_seconds: u64,
    pub pm: Result<PmReading, SensorFault>,
    pub climate: Result<ClimateReading, SensorFault>,
    pub publish: Result<Publish, Error>,
    /// Length of the packet handed to the uplink.
    pub packet: Result<usize, Error>,
}

impl CycleReport {
    /// True when every phase succeeded (a skipped publish counts).
    pub fn is_clean(&self) -> bool {
        self.pm.is_ok() && self.climate.is_ok() && self.publish.is_ok() && self.packet.is_ok()
    }
}

/// The recurring sample → aggregate → notify → format sequence.
pub struct TelemetryCycle<'a, P, C, T, U> {
    pm_sensor: P,
    climate_sensor: C,
    publisher: NotificationPublisher<'a, T>,
    uplink: U,
    identity: &'a DeviceIdentity,
    gate: &'a NotificationGate,
    phase: CyclePhase,
    completed: u32,
}

impl<'a, P, C, T, U> TelemetryCycle<'a, P, C, T, U>
where
    P: ParticulateSensor,
    C: ClimateSensor,
    T: NotifyTransport,
    U: Uplink,
{
    pub fn new(
        pm_sensor: P,
        climate_sensor: C,
        publisher: NotificationPublisher<'a, T>,
        uplink: U,
        identity: &'a DeviceIdentity,
        gate: &'a NotificationGate,
    ) -> Self {
        Self {
            pm_sensor,
            climate_sensor,
            publisher,
            uplink,
            identity,
            gate,
            phase: CyclePhase::Idle,
            completed: 0,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Cycles run to completion since construction.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn publisher(&self) -> &NotificationPublisher<'a, T> {
        &self.publisher
    }

    pub fn uplink(&self) -> &U {
        &self.uplink
    }

    pub fn uplink_mut(&mut self) -> &mut U {
        &mut self.uplink
    }

    fn enter(&mut self, phase: CyclePhase) {
        trace!("Cycle phase {}", phase);
        self.phase = phase;
    }

    /// Run one full cycle. `uptime_seconds` is stamped into the record.
    pub async fn run_once(&mut self, uptime_seconds: u64) -> CycleReport {
        self.enter(CyclePhase::Sampling);
        let pm = self
            .pm_sensor
            .poll()
            .await
            .map_err(|_| SensorFault::Particulate);
        if pm.is_err() {
            warn!("PM sensor poll failed");
        }
        let climate = self
            .climate_sensor
            .poll()
            .await
            .map_err(|_| SensorFault::Climate);
        if climate.is_err() {
            warn!("Climate sensor poll failed");
        }

        self.enter(CyclePhase::Aggregating);
        let record = aggregate(pm.ok(), climate.ok(), self.identity, uptime_seconds);

        self.enter(CyclePhase::Notifying);
        let publish = self.publisher.publish(&record, self.gate);
        if let Err(e) = publish {
            warn!("PM notification failed: {}", e);
        }

        self.enter(CyclePhase::Formatting);
        let packet = formatter::format(&record).map(|packet| {
            let len = packet.len();
            self.uplink.hand_off(packet);
            len
        });
        if let Err(e) = packet {
            error!("Telemetry packet dropped: {}", e);
        }

        self.enter(CyclePhase::Idle);
        self.completed = self.completed.wrapping_add(1);

        CycleReport {
            uptime_seconds,
            pm,
            climate,
            publish,
            packet,
        }
    }

    /// Wait for `cadence`'s deadline, run one cycle, then advance the
    /// cadence.
    pub async fn step<M: Monotonic, D: DelayNs>(
        &mut self,
        cadence: &mut Cadence,
        clock: &M,
        delay: &mut D,
    ) -> CycleReport {
        let remaining = cadence.remaining_ms(clock.now_ms());
        if remaining > 0 {
            delay
                .delay_ms(u32::try_from(remaining).unwrap_or(u32::MAX))
                .await;
        }

        let report = self.run_once(clock.now_ms() / 1000).await;
        if !report.is_clean() {
            info!("Cycle {} finished with faults: {}", self.completed, report);
        }
        cadence.complete(clock.now_ms());
        report
    }

    /// Run forever at [`TELEMETRY_PERIOD_MS`], first cycle immediately.
    pub async fn run<M: Monotonic, D: DelayNs>(&mut self, clock: &M, delay: &mut D) -> ! {
        let mut cadence = Cadence::new(TELEMETRY_PERIOD_MS, clock.now_ms());
        info!("Telemetry cycle started, period {} ms", TELEMETRY_PERIOD_MS);
        loop {
            self.step(&mut cadence, clock, delay).await;
        }
    }
}
