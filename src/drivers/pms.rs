//! PMS5003 particulate sensor on UARTE0.
//!
//! The sensor streams frames unprompted in active mode. A poll reads
//! byte by byte until one valid frame has been assembled, giving up
//! after a fixed byte budget. Each read awaits the UARTE DMA, so the
//! executor stays free between bytes; the caller bounds the wall time.

use airu_node::config::PMS_FRAME_LEN;
use airu_node::sensors::pms::FrameAssembler;
use airu_node::sensors::ParticulateSensor;
use airu_node::{FrameError, PmReading};
use defmt::{debug, Format};
use embassy_nrf::peripherals::UARTE0;
use embassy_nrf::uarte::{self, Uarte};

/// Bytes read before a poll gives up: enough to resync mid-frame and
/// still see two complete frames.
const READ_BUDGET: usize = 3 * PMS_FRAME_LEN;

#[derive(Debug, Clone, Copy, Format)]
pub enum PmsError {
    Uart(uarte::Error),
    /// Budget exhausted without a valid frame. Carries the last rejection.
    NoFrame(Option<FrameError>),
}

pub struct Pms5003<'d> {
    uarte: Uarte<'d, UARTE0>,
    assembler: FrameAssembler,
}

impl<'d> Pms5003<'d> {
    pub fn new(uarte: Uarte<'d, UARTE0>) -> Self {
        Self {
            uarte,
            assembler: FrameAssembler::new(),
        }
    }
}

impl ParticulateSensor for Pms5003<'_> {
    type Error = PmsError;

    async fn poll(&mut self) -> Result<PmReading, PmsError> {
        // Leftovers from the previous poll are stale.
        self.assembler.reset();

        let mut last_error = None;
        let mut byte = [0u8; 1];
        for _ in 0..READ_BUDGET {
            self.uarte.read(&mut byte).await.map_err(PmsError::Uart)?;
            match self.assembler.push(byte[0]) {
                Some(Ok(reading)) => return Ok(reading),
                Some(Err(e)) => {
                    debug!("PMS frame rejected: {}", e);
                    last_error = Some(e);
                }
                None => {}
            }
        }

        Err(PmsError::NoFrame(last_error))
    }
}
