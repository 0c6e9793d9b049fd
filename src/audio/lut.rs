//! Sine wave lookup table for tone synthesis
//!
//! 256-entry table covering one full cycle.
//! Values are unsigned 8-bit PCM centred on [`SILENCE`], ready for the DAC.

use crate::config::SILENCE;

/// Number of entries in the sine LUT
pub const LUT_SIZE: usize = 256;

/// Peak deviation from the centre value.
pub const AMPLITUDE: u8 = 127;

/// Pre-computed sine wave lookup table
///
/// 256 samples covering 0 to 2π
/// Range: SILENCE - 127 ..= SILENCE + 127 (0 to 254)
/// Index 0 = 0°, 64 = 90°, 128 = 180°, 192 = 270°
pub static SINE_LUT: [u8; LUT_SIZE] = {
    let mut table = [SILENCE; LUT_SIZE];
    let mut i = 0;
    while i < LUT_SIZE {
        let angle = (i as f64) * core::f64::consts::PI * 2.0 / (LUT_SIZE as f64);
        let offset = const_sin(angle) * AMPLITUDE as f64;
        // round half away from zero
        let rounded = if offset >= 0.0 { offset + 0.5 } else { offset - 0.5 };
        table[i] = (SILENCE as i32 + rounded as i32) as u8;
        i += 1;
    }
    table
};

/// Const-compatible sine approximation using Taylor series
const fn const_sin(x: f64) -> f64 {
    // Normalize to [-π, π]
    let mut x = x;
    while x > core::f64::consts::PI {
        x -= 2.0 * core::f64::consts::PI;
    }
    while x < -core::f64::consts::PI {
        x += 2.0 * core::f64::consts::PI;
    }

    let x2 = x * x;
    let x3 = x2 * x;
    let x5 = x3 * x2;
    let x7 = x5 * x2;
    let x9 = x7 * x2;
    let x11 = x9 * x2;

    x - x3 / 6.0 + x5 / 120.0 - x7 / 5040.0 + x9 / 362880.0 - x11 / 39916800.0
}
