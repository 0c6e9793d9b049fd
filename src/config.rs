//! Module: config
//!
//! Purpose: Engine constants and the runtime `EngineConfig`.
//!
//! Architecture:
//! - Constants that shape memory layout or the ISR cadence are compile-time
//! - Everything the cooperative side may tune lives in `EngineConfig`
//! - `EngineConfig` is `Copy`, validated once when the engine is built
//!
//! Safety: Safe. No unsafe blocks.

use core::fmt;

use crate::hal::DacChannel;

/// Output sample clock. The tick timer fires at this rate and every
/// [`WavSample`](crate::audio::WavSample) is converted to it.
pub const OUTPUT_RATE_HZ: u32 = 50_000;

/// Playback buffer size in bytes (usable capacity is one less).
///
/// 4000 bytes ≈ 80 ms of audio at the output rate.
pub const BUFFER_SIZE: usize = 4000;

/// DAC mid-scale, zero net speaker excursion.
pub const SILENCE: u8 = 0x7F;

/// Bytes skipped before sample data in a PCM file.
pub const WAV_HEADER_LEN: usize = 44;

/// Runtime engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// GPIO routed to the DAC (ESP32-S2: 17 or 18, ESP32: 25 or 26).
    pub dac_pin: u8,
    /// Number of discrete steps in the enable/disable ramp.
    pub ramp_steps: u8,
    /// Delay between ramp steps in milliseconds.
    pub ramp_step_ms: u32,
    /// Settle delay after `begin()`, output released.
    pub settle_ms: u32,
    /// Number of `average_usage()` calls before the one-shot report.
    pub usage_window: u32,
}

impl EngineConfig {
    /// Defaults matching the ShyGuy board (speaker on DAC channel 1).
    pub const DEFAULT: Self = Self {
        dac_pin: 17,
        ramp_steps: 20,
        ramp_step_ms: 10,
        settle_ms: 1,
        usage_window: 50,
    };

    /// Check values the engine divides by or iterates over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if DacChannel::for_gpio(self.dac_pin).is_none() {
            return Err(ConfigError::NotADacPin(self.dac_pin));
        }
        if self.ramp_steps == 0 {
            return Err(ConfigError::ZeroRampSteps);
        }
        if self.usage_window == 0 {
            return Err(ConfigError::ZeroUsageWindow);
        }
        Ok(())
    }

    /// Total blocking time of one enable or disable ramp.
    pub fn ramp_duration_ms(&self) -> u32 {
        self.ramp_steps as u32 * self.ramp_step_ms
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration rejected by [`EngineConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `dac_pin` has no DAC channel on this chip
    NotADacPin(u8),
    /// `ramp_steps` must be at least 1
    ZeroRampSteps,
    /// `usage_window` must be at least 1
    ZeroUsageWindow,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADacPin(pin) => write!(f, "GPIO{} is not a DAC pin", pin),
            Self::ZeroRampSteps => write!(f, "ramp_steps must be non-zero"),
            Self::ZeroUsageWindow => write!(f, "usage_window must be non-zero"),
        }
    }
}
