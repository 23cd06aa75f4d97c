//! Sensor sources polled by the telemetry cycle.
//!
//! The cycle only sees the two traits below; each concrete part gets a
//! small driver or decoder module. Polls are async so a slow sensor
//! yields to the rest of the executor instead of stalling it.

pub mod hdc1080;
pub mod pms;

use crate::record::{ClimateReading, PmReading};

/// Particulate-matter sensor. `poll` completes one hardware
/// transaction and returns the latest concentrations.
#[allow(async_fn_in_trait)]
pub trait ParticulateSensor {
    type Error;

    async fn poll(&mut self) -> Result<PmReading, Self::Error>;
}

/// Temperature / humidity sensor.
#[allow(async_fn_in_trait)]
pub trait ClimateSensor {
    type Error;

    async fn poll(&mut self) -> Result<ClimateReading, Self::Error>;
}

impl<S: ParticulateSensor + ?Sized> ParticulateSensor for &mut S {
    type Error = S::Error;

    async fn poll(&mut self) -> Result<PmReading, Self::Error> {
        (**self).poll().await
    }
}

impl<S: ClimateSensor + ?Sized> ClimateSensor for &mut S {
    type Error = S::Error;

    async fn poll(&mut self) -> Result<ClimateReading, Self::Error> {
        (**self).poll().await
    }
}
