//! RT-safe logging for the ShyGuy firmware.
//!
//! # Architecture
//!
//! ```text
//! main loop              LogStream            UART drain
//! ─────────              ─────────            ──────────
//!
//! log::info!() ───────▶ [L0][L1][L2] ──────▶ UART TX
//! RingLogger              lock-free           between fills
//! non-blocking            ring buffer
//! ```
//!
//! # Rules
//!
//! - The timer ISR never logs, not even through the ring
//! - Everything else logs through the `log` facade, backed by [`RingLogger`]
//! - Pushing never blocks; messages are dropped (and counted) when full
//! - The UART write happens later, in small batches, so a slow serial port
//!   can never starve `fill_buffer()`

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 96;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Trace => LogLevel::Trace,
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text (invalid UTF-8 is replaced by a marker).
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

struct Slot {
    /// Entry fully written, not yet drained.
    ready: AtomicBool,
    entry: UnsafeCell<LogEntry>,
}

impl Slot {
    const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            entry: UnsafeCell::new(LogEntry::EMPTY),
        }
    }
}

/// Lock-free log stream (multiple producers, single consumer).
///
/// - Producers reserve a slot with a CAS on `write_idx`, fill it, then
///   publish it through the slot's `ready` flag
/// - Push never blocks (drops message if full)
/// - The drain stops at the first reserved-but-unpublished slot
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    slots: [Slot; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: a slot is written only by the producer that reserved it and read
// only by the single consumer after `ready` is observed with Acquire.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            slots: [const { Slot::new() }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    /// Messages longer than [`MAX_MSG_LEN`] are truncated.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let mut write = self.write_idx.load(Ordering::Relaxed);
        loop {
            let read = self.read_idx.load(Ordering::Acquire);
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }

            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => write = actual,
            }
        }

        let slot = &self.slots[write as usize & Self::MASK];

        // SAFETY: the CAS above gave this producer exclusive ownership of the
        // slot; the consumer skips it until `ready` is set.
        unsafe {
            let entry = &mut *slot.entry.get();
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }

        slot.ready.store(true, Ordering::Release);
        true
    }

    /// Drain next log entry (single consumer).
    ///
    /// Returns `None` if no published entry is available.
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        if read == self.write_idx.load(Ordering::Acquire) {
            return None;
        }

        let slot = &self.slots[read as usize & Self::MASK];
        if !slot.ready.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: `ready` means the producer is done with the slot.
        let entry = unsafe { *slot.entry.get() };
        slot.ready.store(false, Ordering::Relaxed);

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Get number of entries reserved but not yet drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// `log` backend that pushes into a [`LogStream`].
pub struct RingLogger<const N: usize = LOG_BUFFER_SIZE> {
    stream: &'static LogStream<N>,
    clock: fn() -> i64,
    level: log::LevelFilter,
}

impl<const N: usize> RingLogger<N> {
    pub const fn new(stream: &'static LogStream<N>, clock: fn() -> i64, level: log::LevelFilter) -> Self {
        Self { stream, clock, level }
    }

    pub fn stream(&self) -> &'static LogStream<N> {
        self.stream
    }
}

impl<const N: usize> log::Log for RingLogger<N> {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut buf = [0u8; MAX_MSG_LEN];
        let len = format_to_buffer(&mut buf, *record.args());
        self.stream.push((self.clock)(), record.level().into(), &buf[..len]);
    }

    fn flush(&self) {}
}

/// Format a message into a buffer.
///
/// Output beyond the buffer is truncated. Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}
