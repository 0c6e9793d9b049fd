//! Global log stream and `log` backend.
//!
//! Single stream: the main loop is the only context that logs, the UART
//! drain is the only reader.

use crate::logging::{LogStream, RingLogger};

/// Log stream drained to UART by the main loop.
pub static LOG_STREAM: LogStream = LogStream::new();

/// `log` facade backend writing into [`LOG_STREAM`].
pub static LOGGER: RingLogger = RingLogger::new(&LOG_STREAM, timestamp_us, log::LevelFilter::Trace);

/// Install [`LOGGER`] as the global logger.
///
/// Fails only if another logger was installed first.
pub fn init_logging(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer_get_time has no preconditions.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Host builds have no boot clock; entries keep their queue order.
#[cfg(not(target_os = "espidf"))]
pub fn timestamp_us() -> i64 {
    0
}
