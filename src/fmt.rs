//! Crate-internal logging macros.
//!
//! With the `defmt` feature these forward to `defmt`; without it the
//! arguments are evaluated and dropped so host builds need no logger.
//! Only pass references or `Copy` values: the no-op variant takes its
//! arguments by value.

#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::defmt::trace!($($arg)*)
    };
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::defmt::debug!($($arg)*)
    };
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)*) => {
        ::defmt::info!($($arg)*)
    };
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::defmt::warn!($($arg)*)
    };
}

#[cfg(feature = "defmt")]
macro_rules! error {
    ($($arg:tt)*) => {
        ::defmt::error!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:expr),* $(,)?) => {{
        let _ = ($($arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:expr),* $(,)?) => {{
        let _ = ($($arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:expr),* $(,)?) => {{
        let _ = ($($arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:expr),* $(,)?) => {{
        let _ = ($($arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! error {
    ($($arg:expr),* $(,)?) => {{
        let _ = ($($arg,)*);
    }};
}

#[cfg(all(test, not(feature = "defmt")))]
mod tests {
    #[test]
    fn no_op_macros_accept_bare_and_formatted_messages() {
        let count = 3u32;
        trace!("bare message");
        debug!("count {}", count);
        info!("{} of {}", count, "cycles",);
        warn!("bare message",);
        error!("count {}", count);
        assert_eq!(count, 3);
    }
}
