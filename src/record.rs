//! Sensor readings and the per-cycle telemetry snapshot.

use crate::config::SENSOR_FAULT_SENTINEL;
use crate::identity::DeviceIdentity;

/// Particulate mass concentrations (µg/m³).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PmReading {
    pub pm1: f32,
    pub pm2_5: f32,
    pub pm10: f32,
}

impl PmReading {
    /// Reading whose every field carries the failure sentinel.
    pub const FAULT: Self = Self {
        pm1: SENSOR_FAULT_SENTINEL,
        pm2_5: SENSOR_FAULT_SENTINEL,
        pm10: SENSOR_FAULT_SENTINEL,
    };
}

/// Temperature (°C) and relative humidity (%RH).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateReading {
    pub temperature: f32,
    pub humidity: f32,
}

impl ClimateReading {
    /// Reading whose every field carries the failure sentinel.
    pub const FAULT: Self = Self {
        temperature: SENSOR_FAULT_SENTINEL,
        humidity: SENSOR_FAULT_SENTINEL,
    };
}

/// Immutable snapshot built once per telemetry cycle.
///
/// Borrows the identity, which outlives every cycle. Fields whose poll
/// failed hold [`SENSOR_FAULT_SENTINEL`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetryRecord<'a> {
    pub device_id: &'a str,
    pub firmware_version: &'a str,
    pub uptime_seconds: u64,
    pub pm1: f32,
    pub pm2_5: f32,
    pub pm10: f32,
    pub temperature: f32,
    pub humidity: f32,
}

impl TelemetryRecord<'_> {
    pub fn pm(&self) -> PmReading {
        PmReading {
            pm1: self.pm1,
            pm2_5: self.pm2_5,
            pm10: self.pm10,
        }
    }

    pub fn climate(&self) -> ClimateReading {
        ClimateReading {
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }

    pub fn pm_faulted(&self) -> bool {
        self.pm() == PmReading::FAULT
    }

    pub fn climate_faulted(&self) -> bool {
        self.climate() == ClimateReading::FAULT
    }
}

/// Combine both sensor polls and the device metadata into one record.
///
/// A failed poll (`None`) only marks its own fields; the record is
/// always produced.
pub fn aggregate<'a>(
    pm: Option<PmReading>,
    climate: Option<ClimateReading>,
    identity: &'a DeviceIdentity,
    uptime_seconds: u64,
) -> TelemetryRecord<'a> {
    let pm = pm.unwrap_or(PmReading::FAULT);
    let climate = climate.unwrap_or(ClimateReading::FAULT);

    TelemetryRecord {
        device_id: identity.address(),
        firmware_version: identity.firmware_version(),
        uptime_seconds,
        pm1: pm.pm1,
        pm2_5: pm.pm2_5,
        pm10: pm.pm10,
        temperature: climate.temperature,
        humidity: climate.humidity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("AA:BB:CC:DD:EE:FF", "1.2.0").unwrap()
    }

    const PM: PmReading = PmReading {
        pm1: 1.0,
        pm2_5: 2.5,
        pm10: 10.0,
    };

    const CLIMATE: ClimateReading = ClimateReading {
        temperature: 22.5,
        humidity: 45.0,
    };

    #[test]
    fn aggregate_copies_all_inputs() {
        let id = identity();
        let record = aggregate(Some(PM), Some(CLIMATE), &id, 3661);

        assert_eq!(record.device_id, "AA:BB:CC:DD:EE:FF");
        assert_eq!(record.firmware_version, "1.2.0");
        assert_eq!(record.uptime_seconds, 3661);
        assert_eq!(record.pm(), PM);
        assert_eq!(record.climate(), CLIMATE);
        assert!(!record.pm_faulted());
        assert!(!record.climate_faulted());
    }

    #[test]
    fn aggregate_marks_only_failed_pm_fields() {
        let id = identity();
        let record = aggregate(None, Some(CLIMATE), &id, 10);

        assert!(record.pm_faulted());
        assert_eq!(record.pm1, SENSOR_FAULT_SENTINEL);
        assert_eq!(record.temperature, 22.5);
        assert_eq!(record.humidity, 45.0);
    }

    #[test]
    fn aggregate_marks_only_failed_climate_fields() {
        let id = identity();
        let record = aggregate(Some(PM), None, &id, 10);

        assert!(record.climate_faulted());
        assert_eq!(record.pm(), PM);
    }

    #[test]
    fn aggregate_with_both_failures_still_builds_record() {
        let id = identity();
        let record = aggregate(None, None, &id, 0);

        assert!(record.pm_faulted());
        assert!(record.climate_faulted());
        assert_eq!(record.device_id, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn aggregate_is_pure() {
        let id = identity();
        let a = aggregate(Some(PM), Some(CLIMATE), &id, 42);
        let b = aggregate(Some(PM), Some(CLIMATE), &id, 42);
        assert_eq!(a, b);
    }
}
