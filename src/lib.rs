//! # ShyGuy audio
//!
//! Interrupt-driven 8-bit DAC audio for the ShyGuy robotic face.
//!
//! ## Architecture
//!
//! Two execution contexts share one [`AudioCore`]:
//! - The main loop owns the [`AudioEngine`]: it plays sounds and keeps the
//!   playback buffer topped up with `fill_buffer()`
//! - A 50 kHz timer interrupt runs the [`TimerConsumer`], draining one byte
//!   per tick to the DAC
//! - They meet only at the buffer cursors and a few atomics. No mutexes,
//!   no critical sections
//!
//! Face animation, display and servo code never touch the engine internals.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod config;
pub mod hal;
pub mod log_globals;
pub mod logging;
pub mod stats;
pub mod uart_logger;

pub use audio::{AudioCore, AudioEngine, PlaybackBuffer, TimerConsumer, WavSample};
pub use config::{EngineConfig, BUFFER_SIZE, OUTPUT_RATE_HZ, SILENCE};
pub use hal::{DacOutput, TickTimer};
#[cfg(target_os = "espidf")]
pub use hal::HalError;
pub use log_globals::{LOGGER, LOG_STREAM};
pub use stats::{PlaybackStats, StatsSnapshot};
