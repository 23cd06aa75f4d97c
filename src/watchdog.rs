//! Dead-man's switch.
//!
//! Armed at boot and restarts the node once [`WATCHDOG_PERIOD_MS`] has
//! elapsed. There is no kick: the restart is unconditional, whatever the
//! health of the rest of the system.

use embedded_hal_async::delay::DelayNs;

use crate::config::WATCHDOG_PERIOD_MS;
use crate::scheduler::Monotonic;

/// Performs the full restart. Never returns.
pub trait Restart {
    fn restart(&mut self) -> !;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogState {
    Armed { remaining_ms: u64 },
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Watchdog {
    period_ms: u64,
    armed_at_ms: u64,
}

impl Watchdog {
    /// Arm with the node's fixed period.
    pub const fn arm(now_ms: u64) -> Self {
        Self::with_period(WATCHDOG_PERIOD_MS, now_ms)
    }

    pub const fn with_period(period_ms: u64, now_ms: u64) -> Self {
        Self {
            period_ms,
            armed_at_ms: now_ms,
        }
    }

    /// Instant at which the watchdog fires.
    pub fn expires_at_ms(&self) -> u64 {
        self.armed_at_ms.saturating_add(self.period_ms)
    }

    pub fn state(&self, now_ms: u64) -> WatchdogState {
        match self.expires_at_ms().checked_sub(now_ms) {
            Some(remaining_ms) if remaining_ms > 0 => WatchdogState::Armed { remaining_ms },
            _ => WatchdogState::Expired,
        }
    }

    /// Sleep until expiry, then restart.
    pub async fn run<M, D, R>(&self, clock: &M, delay: &mut D, restart: &mut R) -> !
    where
        M: Monotonic,
        D: DelayNs,
        R: Restart,
    {
        info!("Watchdog armed, restart in {} ms", self.period_ms);
        while let WatchdogState::Armed { remaining_ms } = self.state(clock.now_ms()) {
            delay
                .delay_ms(u32::try_from(remaining_ms).unwrap_or(u32::MAX))
                .await;
        }

        warn!("Watchdog expired. Rebooting");
        restart.restart()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embassy_futures::block_on;
    use std::panic::{self, AssertUnwindSafe};

    struct FakeTime {
        now: Cell<u64>,
    }

    impl Monotonic for FakeTime {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }
    }

    struct FakeDelay<'a> {
        time: &'a FakeTime,
        calls: u32,
    }

    impl DelayNs for FakeDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.time.now.set(self.time.now.get() + u64::from(ns / 1_000_000));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.calls += 1;
            self.time.now.set(self.time.now.get() + u64::from(ms));
        }
    }

    /// Restart double: unwinds with the instant it was asked to restart.
    struct PanicRestart<'a> {
        time: &'a FakeTime,
    }

    impl Restart for PanicRestart<'_> {
        fn restart(&mut self) -> ! {
            panic::panic_any(self.time.now.get())
        }
    }

    #[test]
    fn armed_until_period_elapses() {
        let wd = Watchdog::arm(1_000);
        assert_eq!(
            wd.state(1_000),
            WatchdogState::Armed {
                remaining_ms: WATCHDOG_PERIOD_MS
            }
        );
        assert_eq!(
            wd.state(1_000 + WATCHDOG_PERIOD_MS - 1),
            WatchdogState::Armed { remaining_ms: 1 }
        );
        assert_eq!(wd.state(1_000 + WATCHDOG_PERIOD_MS), WatchdogState::Expired);
        assert_eq!(wd.state(u64::MAX), WatchdogState::Expired);
    }

    #[test]
    fn period_is_one_hour() {
        assert_eq!(Watchdog::arm(0).expires_at_ms(), 3_600_000);
    }

    #[test]
    fn run_restarts_exactly_at_expiry() {
        let time = FakeTime { now: Cell::new(0) };
        let mut delay = FakeDelay {
            time: &time,
            calls: 0,
        };
        let mut restart = PanicRestart { time: &time };
        let wd = Watchdog::with_period(5_000, 0);

        let fired = panic::catch_unwind(AssertUnwindSafe(|| {
            block_on(wd.run(&time, &mut delay, &mut restart));
        }));

        let at = *fired.unwrap_err().downcast::<u64>().unwrap();
        assert_eq!(at, 5_000);
        assert_eq!(delay.calls, 1);
    }

    #[test]
    fn run_restarts_immediately_when_already_expired() {
        let time = FakeTime {
            now: Cell::new(10_000),
        };
        let mut delay = FakeDelay {
            time: &time,
            calls: 0,
        };
        let mut restart = PanicRestart { time: &time };
        let wd = Watchdog::with_period(5_000, 0);

        let fired = panic::catch_unwind(AssertUnwindSafe(|| {
            block_on(wd.run(&time, &mut delay, &mut restart));
        }));

        assert!(fired.is_err());
        assert_eq!(delay.calls, 0);
    }
}
