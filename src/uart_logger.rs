//! UART log output.
//!
//! Drains the log stream to a TX-only UART from the main loop, a few
//! entries per call, so the audio fill is never held up by the serial port.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S2 GPIO43 (U0TXD) ──────▶ USB-UART RX
//!                                  └─▶ PC Serial Monitor
//! ```

use crate::logging::{format_to_buffer, LogEntry, LogStream};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// Largest formatted line: timestamp + level + message + newline.
pub const LINE_LEN: usize = 128;

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
    /// Entries written per `drain` call.
    pub batch: usize,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 43, // U0TXD on ESP32-S2
            batch: 4,
        }
    }
}

/// Format log entry to text.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Drain up to `max` entries into `sink`, one formatted line per call.
///
/// If the stream dropped messages, a warning line with the count follows
/// and the counter is reset. Returns the number of entries written.
pub fn drain_lines<const N: usize>(
    stream: &LogStream<N>,
    max: usize,
    mut sink: impl FnMut(&[u8]),
) -> usize {
    let mut line = [0u8; LINE_LEN];
    let mut written = 0;

    while written < max {
        let Some(entry) = stream.drain() else {
            break;
        };
        let len = format_log_entry(&entry, &mut line);
        sink(&line[..len]);
        written += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let len = format_to_buffer(&mut line, format_args!("[WARN] Dropped: {}\n", dropped));
        sink(&line[..len]);
        stream.reset_dropped();
    }

    written
}

/// Initialize a TX-only UART for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d, U: uart::Uart>(
    uart: impl Peripheral<P = U> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Write up to `max` pending entries of `stream` to the UART.
#[cfg(target_os = "espidf")]
pub fn drain_to_uart<const N: usize>(
    uart: &mut UartTxDriver<'_>,
    stream: &LogStream<N>,
    max: usize,
) -> usize {
    drain_lines(stream, max, |line| {
        let _ = uart.write(line);
    })
}
