//! Unified error type for the telemetry core.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Derives `defmt::Format` (behind the `defmt` feature) for on-target
//! logging.

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // BLE
    /// Submitting a notification to the BLE stack failed.
    Transport(TransportError),

    /// A write arrived for a handle that is not in the attribute table.
    UnknownAttribute(u16),

    // Sensors
    /// A sensor poll failed.
    Sensor(SensorFault),

    /// A particulate sensor frame was malformed.
    InvalidFrame(FrameError),

    // Telemetry
    /// The rendered packet would not fit in `MAX_PACKET_LEN` bytes.
    PacketOverflow,

    /// The device address or firmware version was empty or too long.
    InvalidIdentity,
}

/// Notification transport failures reported by the BLE stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No peer is connected.
    NoPeer,
    /// The stack has no free notification buffers.
    BufferFull,
    /// Raw error code from the BLE stack.
    Raw(u32),
}

/// Which sensor failed to produce a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFault {
    Particulate,
    Climate,
}

/// Reasons a particulate sensor frame is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// The frame did not start with `0x42 0x4D`.
    BadStart,
    /// The length field did not match the fixed frame length.
    BadLength(u16),
    /// The trailing sum did not match the frame contents.
    Checksum { expected: u16, actual: u16 },
}

// Convenience conversions

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Error::Sensor(e)
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::InvalidFrame(e)
    }
}
