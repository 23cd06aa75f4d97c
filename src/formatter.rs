//! Upload packet rendering (line-protocol style).
//!
//! ```text
//! airQuality,ID=<address>,SensorModel=H2+<version> SecActive=<uptime>,PM1=<x.xx>,PM2.5=<x.xx>,PM10=<x.xx>,Temperature=<x.xx>,Humidity=<x.xx>
//! ```
//!
//! The packet is built in a fixed-capacity buffer owned by the caller's
//! cycle; a record that does not fit is rejected, never truncated.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::{MAX_PACKET_LEN, MEASUREMENT_NAME, SENSOR_MODEL_PREFIX};
use crate::error::Error;
use crate::record::TelemetryRecord;

/// One rendered upload packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    text: String<MAX_PACKET_LEN>,
}

impl Packet {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Packet {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

/// Render `record` into an upload packet.
///
/// Fails with [`Error::PacketOverflow`] if the result would exceed
/// [`MAX_PACKET_LEN`] bytes.
pub fn format(record: &TelemetryRecord<'_>) -> Result<Packet, Error> {
    let mut text = String::new();
    write!(
        text,
        "{},ID={},SensorModel={}{} SecActive={},PM1={:.2},PM2.5={:.2},PM10={:.2},Temperature={:.2},Humidity={:.2}",
        MEASUREMENT_NAME,
        record.device_id,
        SENSOR_MODEL_PREFIX,
        record.firmware_version,
        record.uptime_seconds,
        record.pm1,
        record.pm2_5,
        record.pm10,
        record.temperature,
        record.humidity,
    )
    .map_err(|_| Error::PacketOverflow)?;

    Ok(Packet { text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ClimateReading, PmReading};

    fn record<'a>(id: &'a str, version: &'a str) -> TelemetryRecord<'a> {
        TelemetryRecord {
            device_id: id,
            firmware_version: version,
            uptime_seconds: 3661,
            pm1: 1.0,
            pm2_5: 2.345,
            pm10: 3.1,
            temperature: 22.5,
            humidity: 45.0,
        }
    }

    /// Split a packet into its `key=value` pairs, measurement name excluded.
    fn pairs(packet: &str) -> heapless::Vec<(&str, &str), 16> {
        let mut out = heapless::Vec::new();
        let (tags, fields) = packet.split_once(' ').unwrap();
        for pair in tags.split(',').skip(1).chain(fields.split(',')) {
            let (k, v) = pair.split_once('=').unwrap();
            out.push((k, v)).unwrap();
        }
        out
    }

    fn value<'p>(pairs: &[(&str, &'p str)], key: &str) -> &'p str {
        pairs.iter().find(|(k, _)| *k == key).unwrap().1
    }

    #[test]
    fn renders_reference_packet() {
        let packet = format(&record("AA:BB:CC:DD:EE:FF", "1.2.0")).unwrap();
        assert_eq!(
            packet.as_str(),
            "airQuality,ID=AA:BB:CC:DD:EE:FF,SensorModel=H2+1.2.0 SecActive=3661,PM1=1.00,PM2.5=2.35,PM10=3.10,Temperature=22.50,Humidity=45.00"
        );
        assert!(packet.len() < MAX_PACKET_LEN);
    }

    #[test]
    fn rendering_is_deterministic() {
        let r = record("AA:BB:CC:DD:EE:FF", "1.2.0");
        let a = format(&r).unwrap();
        let b = format(&r).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn fields_parse_back_to_record_values() {
        let r = TelemetryRecord {
            uptime_seconds: 86_400,
            pm1: 12.344,
            pm2_5: 0.006,
            pm10: 150.5,
            temperature: -5.25,
            humidity: 99.99,
            ..record("C0:00:00:0A:00:01", "0.9.7-rc1")
        };
        let packet = format(&r).unwrap();
        let kv = pairs(packet.as_str());

        assert!(packet.as_str().starts_with("airQuality,"));
        assert_eq!(value(&kv, "ID"), r.device_id);
        assert_eq!(value(&kv, "SensorModel"), "H2+0.9.7-rc1");
        assert_eq!(value(&kv, "SecActive").parse::<u64>().unwrap(), 86_400);

        let expected = [
            ("PM1", r.pm1),
            ("PM2.5", r.pm2_5),
            ("PM10", r.pm10),
            ("Temperature", r.temperature),
            ("Humidity", r.humidity),
        ];
        for (key, want) in expected {
            let text = value(&kv, key);
            let (_, frac) = text.split_once('.').unwrap();
            assert_eq!(frac.len(), 2, "{key} must carry two decimals");
            let got: f32 = text.parse().unwrap();
            assert!((got - want).abs() <= 0.005 + f32::EPSILON, "{key}: {got} vs {want}");
        }
    }

    #[test]
    fn sentinel_fields_render_as_numbers() {
        let pm = PmReading::FAULT;
        let climate = ClimateReading::FAULT;
        let r = TelemetryRecord {
            pm1: pm.pm1,
            pm2_5: pm.pm2_5,
            pm10: pm.pm10,
            temperature: climate.temperature,
            humidity: climate.humidity,
            ..record("AA:BB:CC:DD:EE:FF", "1.2.0")
        };
        let packet = format(&r).unwrap();
        assert!(packet
            .as_str()
            .ends_with("PM1=-999.00,PM2.5=-999.00,PM10=-999.00,Temperature=-999.00,Humidity=-999.00"));
    }

    #[test]
    fn oversized_packet_is_rejected_not_truncated() {
        let long_version = "x".repeat(MAX_PACKET_LEN);
        let r = record("AA:BB:CC:DD:EE:FF", &long_version);
        assert_eq!(format(&r), Err(Error::PacketOverflow));
    }

    #[test]
    fn huge_readings_overflow() {
        let r = TelemetryRecord {
            pm1: f32::MAX,
            pm2_5: f32::MAX,
            pm10: f32::MAX,
            temperature: f32::MAX,
            humidity: f32::MAX,
            ..record("AA:BB:CC:DD:EE:FF", "1.2.0")
        };
        // Each f32::MAX field renders to 42 characters.
        assert_eq!(format(&r), Err(Error::PacketOverflow));
    }

    #[test]
    fn three_huge_pm_fields_still_fit() {
        let r = TelemetryRecord {
            pm1: f32::MAX,
            pm2_5: f32::MAX,
            pm10: f32::MAX,
            ..record("AA:BB:CC:DD:EE:FF", "1.2.0")
        };
        let packet = format(&r).unwrap();
        assert!(packet.len() <= MAX_PACKET_LEN);
        assert!(packet.as_str().ends_with("Temperature=22.50,Humidity=45.00"));
    }

    #[test]
    fn packet_of_exactly_max_len_is_accepted() {
        let base = format(&record("AA:BB:CC:DD:EE:FF", "")).unwrap().len();

        let fits = "x".repeat(MAX_PACKET_LEN - base);
        let packet = format(&record("AA:BB:CC:DD:EE:FF", &fits)).unwrap();
        assert_eq!(packet.len(), MAX_PACKET_LEN);

        let one_over = "x".repeat(MAX_PACKET_LEN - base + 1);
        assert_eq!(
            format(&record("AA:BB:CC:DD:EE:FF", &one_over)),
            Err(Error::PacketOverflow)
        );
    }
}
