//! TI HDC1080 temperature / humidity sensor over I²C.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::ClimateSensor;
use crate::config::{HDC1080_ADDRESS, HDC1080_CONVERSION_MS};
use crate::record::ClimateReading;

const REG_TEMPERATURE: u8 = 0x00;
const REG_CONFIGURATION: u8 = 0x02;

/// Configuration: acquire temperature and humidity in one sequence,
/// 14-bit resolution for both.
const CONFIG_ACQUIRE_BOTH: u16 = 0x1000;

/// Convert a raw temperature word to °C.
pub fn convert_temperature(raw: u16) -> f32 {
    f32::from(raw) / 65536.0 * 165.0 - 40.0
}

/// Convert a raw humidity word to %RH.
pub fn convert_humidity(raw: u16) -> f32 {
    f32::from(raw) / 65536.0 * 100.0
}

pub struct Hdc1080<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Hdc1080<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Put the sensor in combined acquisition mode.
    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        let [hi, lo] = CONFIG_ACQUIRE_BOTH.to_be_bytes();
        self.i2c
            .write(HDC1080_ADDRESS, &[REG_CONFIGURATION, hi, lo])
            .await
    }

    /// Trigger one conversion and read both channels.
    pub async fn measure(&mut self) -> Result<ClimateReading, I2C::Error> {
        self.i2c.write(HDC1080_ADDRESS, &[REG_TEMPERATURE]).await?;
        self.delay.delay_ms(HDC1080_CONVERSION_MS).await;

        let mut buf = [0u8; 4];
        self.i2c.read(HDC1080_ADDRESS, &mut buf).await?;

        Ok(ClimateReading {
            temperature: convert_temperature(u16::from_be_bytes([buf[0], buf[1]])),
            humidity: convert_humidity(u16::from_be_bytes([buf[2], buf[3]])),
        })
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> ClimateSensor for Hdc1080<I2C, D> {
    type Error = I2C::Error;

    async fn poll(&mut self) -> Result<ClimateReading, Self::Error> {
        self.measure().await
    }
}
