//! Timer consumer: the 50 kHz interrupt path.
//!
//! # Rules
//!
//! - Runs in interrupt context every 20 µs
//! - Never blocks, never allocates, never logs
//! - Owns `play_pos`, `fill_limit`, `last_value` and the stats counters

use super::engine::AudioCore;
use crate::config::BUFFER_SIZE;
use crate::hal::DacOutput;

/// Non-owning handle on the engine core for the timer ISR.
///
/// There must be exactly one `TimerConsumer` ticking per core: it is the
/// buffer's single consumer.
pub struct TimerConsumer<'a, D: DacOutput, const N: usize = BUFFER_SIZE> {
    core: &'a AudioCore<D, N>,
}

impl<'a, D: DacOutput, const N: usize> TimerConsumer<'a, D, N> {
    pub(crate) fn new(core: &'a AudioCore<D, N>) -> Self {
        Self { core }
    }

    /// Drain one buffer slot to the DAC.
    ///
    /// Writes only when the value changed since the last physical write.
    /// Counts a usage tick whenever a sound has been attached, whether or
    /// not new data was available.
    #[inline]
    pub fn tick(&self) {
        let core = self.core;
        if !core.is_enabled() {
            return;
        }

        let buffer = core.buffer();
        match buffer.try_consume() {
            Some(value) if value != buffer.last_value() => {
                core.dac().write(value);
                buffer.set_last_value(value);
                core.stats().record_dac_write();
            }
            Some(_) => {}
            None => core.stats().record_underrun(),
        }

        if core.has_source() {
            core.stats().record_usage_tick();
        }
    }
}
