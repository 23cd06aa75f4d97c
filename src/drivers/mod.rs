//! Peripheral drivers that only exist on target.
//!
//! The HDC1080 driver is target-independent and lives in the library;
//! it runs here on the async TWIM. Every sensor is wrapped in
//! [`timeout::Bounded`] so a silent part costs one timeout, not a hung
//! cycle.

pub mod pms;
pub mod timeout;
