//! Tone synthesis for the built-in face sounds.
//!
//! Uses the sine LUT and a fixed-point phase accumulator for frequency
//! control, plus a linear fade at both ends of a rendered sound so it
//! starts and stops at the DAC mid-point without a click.
//!
//! Rendering happens once at boot into heap buffers that are then played
//! through [`WavSample`](super::WavSample) like any other sound.

use super::lut::{LUT_SIZE, SINE_LUT};
use super::wav::pcm8_header;
use crate::config::{SILENCE, WAV_HEADER_LEN};

/// Sine oscillator producing unsigned 8-bit samples.
pub struct ToneGen {
    /// Phase accumulator (32-bit fixed point, top 8 bits = LUT index)
    phase: u32,
    /// Phase increment per sample (determines frequency)
    phase_inc: u32,
    sample_rate: u32,
}

impl ToneGen {
    /// Create a generator for `freq_hz` at `sample_rate`.
    pub fn new(freq_hz: u32, sample_rate: u32) -> Self {
        Self {
            phase: 0,
            phase_inc: Self::calc_phase_inc(freq_hz, sample_rate),
            sample_rate,
        }
    }

    /// phase_inc = (freq * 2^32) / sample_rate
    #[inline]
    fn calc_phase_inc(freq_hz: u32, sample_rate: u32) -> u32 {
        ((freq_hz as u64 * (1u64 << 32)) / sample_rate.max(1) as u64) as u32
    }

    #[inline]
    pub fn set_frequency(&mut self, freq_hz: u32) {
        self.phase_inc = Self::calc_phase_inc(freq_hz, self.sample_rate);
    }

    /// Next sample, centred on [`SILENCE`].
    #[inline]
    pub fn next_sample(&mut self) -> u8 {
        let idx = (self.phase >> 24) as usize;
        self.phase = self.phase.wrapping_add(self.phase_inc);
        SINE_LUT[idx % LUT_SIZE]
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }
}

/// Render a linear frequency sweep as a complete header-prefixed sound.
///
/// Uses all of `out`: 44 header bytes followed by `out.len() - 44` samples
/// at `sample_rate`. `fade` samples at each end ramp in and out of silence.
/// Returns the number of bytes written (0 if `out` cannot hold a header).
pub fn render_sweep(
    out: &mut [u8],
    sample_rate: u32,
    start_hz: u32,
    end_hz: u32,
    fade: usize,
) -> usize {
    if out.len() < WAV_HEADER_LEN {
        return 0;
    }

    let (header, samples) = out.split_at_mut(WAV_HEADER_LEN);
    let count = samples.len();
    header.copy_from_slice(&pcm8_header(sample_rate, count as u32));

    let mut gen = ToneGen::new(start_hz, sample_rate);
    let span = end_hz as i64 - start_hz as i64;
    let fade = fade.max(1);

    for (i, slot) in samples.iter_mut().enumerate() {
        let freq = start_hz as i64 + span * i as i64 / count as i64;
        gen.set_frequency(freq.max(0) as u32);

        let gain = i.min(count - 1 - i).min(fade) as i32;
        let deviation = gen.next_sample() as i32 - SILENCE as i32;
        *slot = (SILENCE as i32 + deviation * gain / fade as i32) as u8;
    }

    out.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_starts_at_midpoint() {
        let mut gen = ToneGen::new(1000, 16_000);
        assert_eq!(gen.next_sample(), SILENCE);
    }

    #[test]
    fn test_quarter_rate_tone_hits_peaks() {
        // fs/4: 0°, 90°, 180°, 270°
        let mut gen = ToneGen::new(4000, 16_000);
        let samples: Vec<u8> = (0..4).map(|_| gen.next_sample()).collect();
        assert_eq!(samples[0], SILENCE);
        assert_eq!(samples[1], 254);
        assert_eq!(samples[2], SILENCE);
        assert_eq!(samples[3], 0);
    }

    #[test]
    fn test_sweep_fades_at_both_ends() {
        let mut out = [0u8; WAV_HEADER_LEN + 400];
        let len = render_sweep(&mut out, 16_000, 800, 1600, 40);
        assert_eq!(len, out.len());
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(out[WAV_HEADER_LEN], SILENCE);
        assert_eq!(out[out.len() - 1], SILENCE);

        // full swing somewhere in the middle
        let body = &out[WAV_HEADER_LEN + 40..out.len() - 40];
        assert!(body.iter().any(|&s| s > 240));
        assert!(body.iter().any(|&s| s < 15));
    }

    #[test]
    fn test_sweep_rejects_tiny_buffer() {
        let mut out = [0u8; 10];
        assert_eq!(render_sweep(&mut out, 16_000, 800, 1600, 4), 0);
    }
}
