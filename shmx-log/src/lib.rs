// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Combines the [`log`] facade with error-propagation macros in the style
//! used throughout the rest of this workspace: a fallible call either
//! `fail!`s (logs then returns/propagates an `Err`) or, for misuse that must
//! never be tolerated from a correctly-behaving caller, `fatal_panic!`s.

use std::sync::Once;

static INIT_VERBOSITY: Once = Once::new();

/// Reads `SHMX_LOG_VERBOSITY` (0-10, default 10) and raises the `log` crate's
/// max level accordingly. Idempotent; safe to call from every entry point
/// (backend creation, allocator init, ...) since only the first call has any
/// effect.
pub fn init_verbosity() {
    INIT_VERBOSITY.call_once(|| {
        let verbosity = std::env::var("SHMX_LOG_VERBOSITY")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(10)
            .min(10);
        let level = match verbosity {
            0 => log::LevelFilter::Error,
            1..=2 => log::LevelFilter::Warn,
            3..=5 => log::LevelFilter::Info,
            6..=8 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        log::set_max_level(level);
    });
}

/// Combines error handling with a log message. Mirrors the call shapes of
/// `iceoryx2_bb_log::fail!`.
#[macro_export]
macro_rules! fail {
    (from $origin:expr, with $error_value:expr, $($message:tt)*) => {{
        log::debug!("{:?}: {}", $origin, format_args!($($message)*));
        return Err($error_value);
    }};
    (with $error_value:expr, $($message:tt)*) => {{
        log::debug!("{}", format_args!($($message)*));
        return Err($error_value);
    }};
    (from $origin:expr, when $call:expr, with $error_value:expr, $($message:tt)*) => {{
        match $call {
            Ok(v) => v,
            Err(_) => {
                log::debug!("{:?}: {}", $origin, format_args!($($message)*));
                return Err($error_value);
            }
        }
    }};
    (from $origin:expr, when $call:expr, $($message:tt)*) => {{
        match $call {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{:?}: {}", $origin, format_args!($($message)*));
                return Err(e.into());
            }
        }
    }};
}

/// Logs a fatal error and aborts the process via panic. Used exclusively
/// for the misuse errors that must terminate the offending process
/// (double-free, foreign-free, mark-bit protocol violation).
#[macro_export]
macro_rules! fatal_panic {
    (from $origin:expr, $($message:tt)*) => {{
        log::error!("{:?}: {}", $origin, format_args!($($message)*));
        panic!("{:?}: {}", $origin, format_args!($($message)*));
    }};
    ($($message:tt)*) => {{
        log::error!("{}", format_args!($($message)*));
        panic!("{}", format_args!($($message)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_defaults_to_trace() {
        init_verbosity();
    }
}
