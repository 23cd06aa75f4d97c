//! Plantower PMS5003 / PMS7003 frame decoding.
//!
//! Frame layout (32 bytes, big-endian words):
//! ```text
//! Bytes 0-1:   start marker 0x42 0x4D
//! Bytes 2-3:   frame length (always 28)
//! Bytes 4-9:   PM1.0 / PM2.5 / PM10, CF=1 (factory environment)
//! Bytes 10-15: PM1.0 / PM2.5 / PM10, atmospheric environment
//! Bytes 16-27: particle counts per 0.1 L
//! Bytes 28-29: reserved
//! Bytes 30-31: sum of bytes 0-29
//! ```

use crate::config::PMS_FRAME_LEN;
use crate::error::FrameError;
use crate::record::PmReading;

const START: [u8; 2] = [0x42, 0x4D];

/// Value of the length field: everything after it.
const BODY_LEN: u16 = (PMS_FRAME_LEN - 4) as u16;

fn word(frame: &[u8; PMS_FRAME_LEN], offset: usize) -> u16 {
    u16::from_be_bytes([frame[offset], frame[offset + 1]])
}

/// Decode one complete frame into atmospheric concentrations (µg/m³).
pub fn decode_frame(frame: &[u8; PMS_FRAME_LEN]) -> Result<PmReading, FrameError> {
    if frame[0..2] != START {
        return Err(FrameError::BadStart);
    }

    let len = word(frame, 2);
    if len != BODY_LEN {
        return Err(FrameError::BadLength(len));
    }

    let actual = frame[..PMS_FRAME_LEN - 2]
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
    let expected = word(frame, PMS_FRAME_LEN - 2);
    if actual != expected {
        return Err(FrameError::Checksum { expected, actual });
    }

    Ok(PmReading {
        pm1: f32::from(word(frame, 10)),
        pm2_5: f32::from(word(frame, 12)),
        pm10: f32::from(word(frame, 14)),
    })
}

/// Reassembles frames from the sensor's byte stream.
///
/// The sensor streams frames continuously; bytes before a start marker
/// are dropped.
pub struct FrameAssembler {
    buf: [u8; PMS_FRAME_LEN],
    len: usize,
}

impl FrameAssembler {
    pub const fn new() -> Self {
        Self {
            buf: [0; PMS_FRAME_LEN],
            len: 0,
        }
    }

    /// Feed one byte. Returns the decoded frame once 32 bytes have been
    /// collected after a start marker.
    pub fn push(&mut self, byte: u8) -> Option<Result<PmReading, FrameError>> {
        match self.len {
            0 if byte != START[0] => return None,
            1 if byte != START[1] => {
                // A repeated first marker byte may still begin a frame.
                self.len = usize::from(byte == START[0]);
                return None;
            }
            _ => {}
        }

        self.buf[self.len] = byte;
        self.len += 1;

        if self.len < PMS_FRAME_LEN {
            return None;
        }

        self.len = 0;
        Some(decode_frame(&self.buf))
    }

    /// Drop any partially collected frame.
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
