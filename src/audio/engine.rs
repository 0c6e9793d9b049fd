//! DAC audio engine: shared core context and cooperative-side control.
//!
//! # Architecture
//!
//! ```text
//! Main loop (cooperative)          AudioCore (shared)          Timer ISR (50 kHz)
//! ───────────────────────          ──────────────────          ──────────────────
//! AudioEngine::fill_buffer() ───▶  PlaybackBuffer  ──────────▶ TimerConsumer::tick()
//!   play / stop / enable           enabled, stats                 └─▶ DacOutput::write
//! ```
//!
//! `AudioCore` lives for the whole program (a `static` or a leaked box on
//! target). `AudioEngine` borrows it from the main loop; the timer
//! interrupt holds a [`TimerConsumer`], a second non-owning reference.
//!
//! # Caller obligations
//!
//! Every `AudioEngine` method belongs to the cooperative context. Calling
//! `play`, `stop` or `fill_buffer` from an interrupt, or driving one core
//! from two engines, breaks the single-producer rule and corrupts the
//! buffer. None of this is checked at runtime.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use super::buffer::PlaybackBuffer;
use super::ramp::Ramp;
use super::timer::TimerConsumer;
use super::wav::WavSample;
use crate::config::{ConfigError, EngineConfig, BUFFER_SIZE, OUTPUT_RATE_HZ, SILENCE};
use crate::hal::{DacOutput, TickTimer};
use crate::stats::{PlaybackStats, UsageProbe};

/// State shared by the main loop and the timer interrupt.
pub struct AudioCore<D: DacOutput, const N: usize = BUFFER_SIZE> {
    buffer: PlaybackBuffer<N>,
    dac: D,
    /// Output active; the ISR returns immediately when false.
    enabled: AtomicBool,
    /// A sound has been attached at least once.
    source_attached: AtomicBool,
    stats: PlaybackStats,
}

impl<D: DacOutput, const N: usize> AudioCore<D, N> {
    /// Create the core with output disabled and the buffer empty.
    pub const fn new(dac: D) -> Self {
        Self {
            buffer: PlaybackBuffer::new(),
            dac,
            enabled: AtomicBool::new(false),
            source_attached: AtomicBool::new(false),
            stats: PlaybackStats::new(),
        }
    }

    /// Handle for the timer interrupt. Create exactly one.
    pub fn consumer(&self) -> TimerConsumer<'_, D, N> {
        TimerConsumer::new(self)
    }

    #[inline]
    pub fn buffer(&self) -> &PlaybackBuffer<N> {
        &self.buffer
    }

    #[inline]
    pub fn dac(&self) -> &D {
        &self.dac
    }

    #[inline]
    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        self.source_attached.load(Ordering::Relaxed)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn attach_source(&self) {
        self.source_attached.store(true, Ordering::Relaxed);
    }
}

/// Cooperative-side engine: lifecycle, producer pump and diagnostics.
///
/// Holds at most one active sound. Starting a sound always preempts the
/// previous one; there is no mixing.
pub struct AudioEngine<'a, D: DacOutput, Dl: DelayNs, const N: usize = BUFFER_SIZE> {
    core: &'a AudioCore<D, N>,
    delay: Dl,
    config: EngineConfig,
    active: Option<&'a WavSample<'a>>,
    usage: UsageProbe,
}

impl<'a, D: DacOutput, Dl: DelayNs, const N: usize> AudioEngine<'a, D, Dl, N> {
    pub fn new(
        core: &'a AudioCore<D, N>,
        delay: Dl,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            core,
            delay,
            config,
            active: None,
            usage: UsageProbe::new(config.usage_window),
        })
    }

    /// Start the tick timer at [`OUTPUT_RATE_HZ`], then hold the output
    /// released for the settle delay so no startup garbage reaches the
    /// speaker.
    pub fn begin<T: TickTimer>(&mut self, timer: &mut T) -> Result<(), T::Error> {
        timer.start(OUTPUT_RATE_HZ)?;

        let dac = self.core.dac();
        dac.write(0);
        dac.release();
        self.delay.delay_ms(self.config.settle_ms);

        log::info!(
            "DAC audio on GPIO{} @ {} Hz, {} byte buffer",
            self.config.dac_pin,
            OUTPUT_RATE_HZ,
            N
        );
        Ok(())
    }

    /// Enable or disable the output with a click-free ramp.
    ///
    /// Enabling ramps 0 → last value before the ISR starts writing.
    /// Disabling marks the output inactive before the ramp starts, so the
    /// timer interrupt stops writing and the ramp alone drives the DAC
    /// down to 0; the pin is then released. Blocks for
    /// `ramp_steps * ramp_step_ms`.
    pub fn enable(&mut self, enable: bool) {
        let core = self.core;

        if enable && !core.is_enabled() {
            core.dac().connect();
            self.run_ramp(Ramp::up(core.buffer().last_value(), self.config.ramp_steps));
            core.set_enabled(true);
            log::debug!("DAC output enabled ({} ms ramp)", self.config.ramp_duration_ms());
        } else if !enable && core.is_enabled() {
            core.set_enabled(false);
            self.run_ramp(Ramp::down(core.buffer().last_value(), self.config.ramp_steps));
            core.dac().release();
            log::debug!("DAC output disabled ({} ms ramp)", self.config.ramp_duration_ms());
        }
    }

    fn run_ramp(&mut self, ramp: Ramp) {
        let dac = self.core.dac();
        let end = ramp.end_value();
        for value in ramp {
            dac.write(value);
            self.delay.delay_ms(self.config.ramp_step_ms);
        }
        dac.write(end);
    }

    /// Stop the current sound and start `sound` from its beginning.
    pub fn play(&mut self, sound: &'a WavSample<'a>) {
        self.stop();
        sound.restart();
        self.active = Some(sound);
        self.core.attach_source();

        log::debug!(
            "play {} samples @ {} Hz",
            sound.sample_count(),
            sound.sample_rate()
        );
    }

    /// Mark the active sound completed.
    ///
    /// The reference is kept; whatever is already buffered (up to one
    /// buffer, ~80 ms) still drains before the output reaches silence.
    pub fn stop(&mut self) {
        if let Some(sound) = self.active {
            sound.stop();
        }
    }

    /// Producer pump. Call from the main loop as often as possible.
    ///
    /// Fills every free slot with the active sound's next byte, or
    /// [`SILENCE`] when nothing is playing. Returns the bytes written.
    pub fn fill_buffer(&mut self) -> usize {
        let buffer = self.core.buffer();
        let free = buffer.free_slots();

        for _ in 0..free {
            let value = match self.active {
                Some(sound) => sound.next_byte(),
                None => SILENCE,
            };
            // free_slots only grows while we fill (consumer side).
            let filled = buffer.fill(value);
            debug_assert!(filled);
        }

        free
    }

    /// One-shot buffer usage diagnostic.
    ///
    /// Call once per main loop iteration. On the call after `usage_window`
    /// earlier calls it logs `Avg Buffer Usage : <n> bytes`, the usage
    /// counter divided by `usage_window`, and returns it, exactly once.
    pub fn average_usage(&mut self) -> Option<u32> {
        let average = self.usage.sample(self.core.stats().usage_ticks())?;
        log::info!("Avg Buffer Usage : {} bytes", average);
        Some(average)
    }

    /// Output currently active.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.core.is_enabled()
    }

    /// A sound is attached and has data left to produce.
    ///
    /// Bytes already in the buffer may still be draining when this
    /// turns false.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.active.is_some_and(|sound| !sound.is_completed())
    }

    /// Currently attached sound, completed or not.
    #[inline]
    pub fn active(&self) -> Option<&'a WavSample<'a>> {
        self.active
    }

    #[inline]
    pub fn stats(&self) -> &'a PlaybackStats {
        self.core.stats()
    }
}
