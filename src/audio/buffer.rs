//! Lock-free playback buffer
//!
//! SPSC byte ring between the cooperative fill loop (producer) and the
//! 50 kHz timer interrupt (consumer). Each cursor has exactly one writer:
//!
//! ```text
//! fill_buffer()                         timer ISR
//! ─────────────                         ─────────
//! fill_pos    ──▶ [ . . x x x x . . ] ──▶ play_pos, fill_limit, last_value
//! ```
//!
//! The slot immediately behind `play_pos` is never written, so `fill_pos`
//! cannot catch `play_pos` from behind and `play_pos == fill_pos` always
//! means empty.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::config::{BUFFER_SIZE, SILENCE};

/// Fixed-capacity circular byte buffer.
///
/// # Contract
///
/// - Only ONE context may call [`fill()`](Self::fill) (the producer).
/// - Only ONE context may call [`consume()`](Self::consume) /
///   [`try_consume()`](Self::try_consume) (the consumer).
///
/// Calling producer methods from the interrupt, or adding a second
/// producer, corrupts the buffer. This is not checked.
pub struct PlaybackBuffer<const N: usize = BUFFER_SIZE> {
    slots: UnsafeCell<[u8; N]>,
    /// Next write index (producer).
    fill_pos: AtomicUsize,
    /// Next read index (consumer).
    play_pos: AtomicUsize,
    /// Exclusive write bound, `(play_pos - 1) mod N` (consumer).
    fill_limit: AtomicUsize,
    /// Last byte written to hardware (consumer).
    last_value: AtomicU8,
}

// SAFETY: Single producer, single consumer. A slot is only written while it
// lies in [fill_pos, fill_limit) and only read while it lies in
// [play_pos, fill_pos); the two ranges never overlap and each boundary is
// published with Release and observed with Acquire.
unsafe impl<const N: usize> Sync for PlaybackBuffer<N> {}
unsafe impl<const N: usize> Send for PlaybackBuffer<N> {}

impl<const N: usize> PlaybackBuffer<N> {
    /// Create an empty buffer holding silence.
    pub const fn new() -> Self {
        const { assert!(N >= 2, "Playback buffer needs at least 2 slots") };

        Self {
            slots: UnsafeCell::new([SILENCE; N]),
            fill_pos: AtomicUsize::new(0),
            play_pos: AtomicUsize::new(0),
            fill_limit: AtomicUsize::new(N - 1),
            last_value: AtomicU8::new(SILENCE),
        }
    }

    #[inline]
    const fn advance(idx: usize) -> usize {
        if idx + 1 == N {
            0
        } else {
            idx + 1
        }
    }

    /// Write one byte (producer side).
    ///
    /// Returns `false` without writing if the buffer is full.
    #[inline]
    pub fn fill(&self, value: u8) -> bool {
        let fill = self.fill_pos.load(Ordering::Relaxed);

        if fill == self.fill_limit.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: Sole producer, `fill` is outside the consumer's readable
        // range until the store below publishes it.
        unsafe {
            self.slots.get().cast::<u8>().add(fill).write(value);
        }

        self.fill_pos.store(Self::advance(fill), Ordering::Release);
        true
    }

    /// Number of bytes the producer may write right now.
    #[inline]
    pub fn free_slots(&self) -> usize {
        let fill = self.fill_pos.load(Ordering::Relaxed);
        let limit = self.fill_limit.load(Ordering::Acquire);
        (limit + N - fill) % N
    }

    /// Read the next byte (consumer side).
    ///
    /// Returns `None` on underrun, leaving all cursors untouched.
    #[inline]
    pub fn try_consume(&self) -> Option<u8> {
        let play = self.play_pos.load(Ordering::Relaxed);

        if play == self.fill_pos.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Sole consumer, `play != fill_pos` so the slot was fully
        // written before fill_pos moved past it.
        let value = unsafe { self.slots.get().cast::<u8>().add(play).read() };

        let next = Self::advance(play);
        self.play_pos.store(next, Ordering::Release);
        self.fill_limit.store(if next == 0 { N - 1 } else { next - 1 }, Ordering::Release);
        Some(value)
    }

    /// Read the next byte, or the last hardware value on underrun.
    #[inline]
    pub fn consume(&self) -> u8 {
        self.try_consume().unwrap_or_else(|| self.last_value())
    }

    /// Last byte physically written to the output.
    #[inline]
    pub fn last_value(&self) -> u8 {
        self.last_value.load(Ordering::Relaxed)
    }

    /// Record a byte as written to hardware (consumer side).
    #[inline]
    pub(crate) fn set_last_value(&self, value: u8) {
        self.last_value.store(value, Ordering::Relaxed);
    }

    #[inline]
    pub fn fill_pos(&self) -> usize {
        self.fill_pos.load(Ordering::Acquire)
    }

    #[inline]
    pub fn play_pos(&self) -> usize {
        self.play_pos.load(Ordering::Acquire)
    }

    #[inline]
    pub fn fill_limit(&self) -> usize {
        self.fill_limit.load(Ordering::Acquire)
    }

    /// Bytes waiting to be played.
    #[inline]
    pub fn len(&self) -> usize {
        let fill = self.fill_pos.load(Ordering::Acquire);
        let play = self.play_pos.load(Ordering::Acquire);
        (fill + N - play) % N
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fill_pos.load(Ordering::Acquire) == self.play_pos.load(Ordering::Acquire)
    }

    /// Usable capacity (`N - 1`).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }
}

impl<const N: usize> Default for PlaybackBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
