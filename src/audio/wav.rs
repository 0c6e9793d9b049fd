//! PCM sample source with sample-and-hold rate conversion
//!
//! Plays 8-bit unsigned mono PCM from a borrowed byte slice at the fixed
//! [`OUTPUT_RATE_HZ`] output clock. Uses a Q16.16 fixed-point step (no
//! floating point in the fill path): every output byte the accumulator
//! advances by `rate / OUTPUT_RATE_HZ`, and the data cursor moves by the
//! number of whole sample periods crossed.
//!
//! Header handling is minimal: sample rate at offsets 24..26 (LE u16),
//! sample data from offset 44. Nothing else is validated.

use core::cell::Cell;

use crate::config::{OUTPUT_RATE_HZ, SILENCE, WAV_HEADER_LEN};

/// Offset of the sample rate field in the header.
pub const RATE_OFFSET: usize = 24;

/// Offset of the `data` chunk size field in the header.
pub const DATA_SIZE_OFFSET: usize = 40;

const FRAC_BITS: u32 = 16;
const FRAC_MASK: u32 = (1 << FRAC_BITS) - 1;

/// One playable sound.
///
/// The bytes are borrowed for `'a`: they must stay alive for as long as the
/// sound may be played or replayed. Playback state uses `Cell`, so the owner
/// and the engine can both hold `&WavSample` in the cooperative context.
/// Never touch a `WavSample` from the interrupt.
#[derive(Debug)]
pub struct WavSample<'a> {
    data: &'a [u8],
    /// End of sample data (exclusive), header included.
    data_len: usize,
    sample_rate: u32,
    /// Source samples per output sample, Q16.16.
    step: u32,
    /// Fractional part of the accumulator, Q0.16.
    phase: Cell<u32>,
    /// Next source byte.
    cursor: Cell<usize>,
    completed: Cell<bool>,
}

impl<'a> WavSample<'a> {
    /// Create a sound from `data`, using the header's sample rate.
    ///
    /// `data_len` is the total length in bytes including the 44-byte
    /// header. It is clamped to `data.len()`.
    pub fn new(data: &'a [u8], data_len: usize) -> Self {
        Self::with_rate(data, data_len, read_rate(data))
    }

    /// Create a sound taking its length from the header's `data` chunk size.
    pub fn from_wav(data: &'a [u8]) -> Self {
        let declared = read_u32(data, DATA_SIZE_OFFSET).unwrap_or(0) as usize;
        Self::new(data, declared.saturating_add(WAV_HEADER_LEN))
    }

    /// Create a sound with an explicit source rate, ignoring the header.
    pub fn with_rate(data: &'a [u8], data_len: usize, sample_rate: u32) -> Self {
        Self {
            data,
            data_len: data_len.min(data.len()),
            sample_rate,
            step: step_for(sample_rate),
            phase: Cell::new(0),
            cursor: Cell::new(WAV_HEADER_LEN),
            completed: Cell::new(true),
        }
    }

    /// Source sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// End of sample data, header included.
    #[inline]
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Number of sample bytes after the header.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.data_len.saturating_sub(WAV_HEADER_LEN)
    }

    /// Index of the next source byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.get()
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    /// Rewind to the first sample and start playing.
    pub fn restart(&self) {
        self.rewind();
        self.completed.set(false);
    }

    /// Mark as completed. Position is kept until the next restart.
    pub fn stop(&self) {
        self.completed.set(true);
    }

    /// Next byte at the output rate.
    ///
    /// Returns [`SILENCE`] once completed. The call that consumes the last
    /// source byte still returns that byte.
    pub fn next_byte(&self) -> u8 {
        if self.completed.get() {
            return SILENCE;
        }

        let cursor = self.cursor.get();
        let Some(&value) = self.data.get(cursor).filter(|_| cursor < self.data_len) else {
            self.finish();
            return SILENCE;
        };

        let acc = self.phase.get() + self.step;
        self.phase.set(acc & FRAC_MASK);

        let next = cursor + (acc >> FRAC_BITS) as usize;
        if next >= self.data_len {
            self.finish();
        } else {
            self.cursor.set(next);
        }

        value
    }

    fn rewind(&self) {
        self.phase.set(0);
        self.cursor.set(WAV_HEADER_LEN);
    }

    fn finish(&self) {
        self.rewind();
        self.completed.set(true);
    }
}

/// Q16.16 step for a source rate against the output clock.
#[inline]
fn step_for(sample_rate: u32) -> u32 {
    let step = ((sample_rate as u64) << FRAC_BITS) / OUTPUT_RATE_HZ as u64;
    // Leave headroom so `phase + step` cannot overflow.
    step.min((u32::MAX - FRAC_MASK) as u64) as u32
}

fn read_rate(data: &[u8]) -> u32 {
    match data.get(RATE_OFFSET..RATE_OFFSET + 2) {
        Some(&[lo, hi]) => u16::from_le_bytes([lo, hi]) as u32,
        _ => 0,
    }
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Build a 44-byte header for 8-bit unsigned mono PCM.
///
/// Layout matches what [`WavSample::new`] and [`WavSample::from_wav`] read.
pub fn pcm8_header(sample_rate: u32, sample_count: u32) -> [u8; WAV_HEADER_LEN] {
    let mut h = [0u8; WAV_HEADER_LEN];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(36 + sample_count).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    h[22..24].copy_from_slice(&1u16.to_le_bytes()); // mono
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&sample_rate.to_le_bytes()); // byte rate
    h[32..34].copy_from_slice(&1u16.to_le_bytes()); // block align
    h[34..36].copy_from_slice(&8u16.to_le_bytes()); // bits per sample
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&sample_count.to_le_bytes());
    h
}
