//! Poll deadline for sensor sources.

use airu_node::sensors::{ClimateSensor, ParticulateSensor};
use airu_node::{ClimateReading, PmReading};
use defmt::Format;
use embassy_time::{with_timeout, Duration};

#[derive(Debug, Clone, Copy, Format)]
pub enum BoundedError<E> {
    Timeout,
    Sensor(E),
}

/// Fails a poll that has not completed within `limit`.
pub struct Bounded<S> {
    sensor: S,
    limit: Duration,
}

impl<S> Bounded<S> {
    pub fn new(sensor: S, limit_ms: u64) -> Self {
        Self {
            sensor,
            limit: Duration::from_millis(limit_ms),
        }
    }
}

impl<S: ParticulateSensor> ParticulateSensor for Bounded<S> {
    type Error = BoundedError<S::Error>;

    async fn poll(&mut self) -> Result<PmReading, Self::Error> {
        with_timeout(self.limit, self.sensor.poll())
            .await
            .map_err(|_| BoundedError::Timeout)?
            .map_err(BoundedError::Sensor)
    }
}

impl<S: ClimateSensor> ClimateSensor for Bounded<S> {
    type Error = BoundedError<S::Error>;

    async fn poll(&mut self) -> Result<ClimateReading, Self::Error> {
        with_timeout(self.limit, self.sensor.poll())
            .await
            .map_err(|_| BoundedError::Timeout)?
            .map_err(BoundedError::Sensor)
    }
}
