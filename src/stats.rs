//! Playback statistics for the DAC engine.
//!
//! Counters are written only by the timer interrupt and read by the
//! cooperative loop. All access is via atomics.
//!
//! The one-shot buffer usage report is driven by [`UsageProbe`], which is
//! keyed to how many times the main loop called it, not to wall-clock time:
//! loop cadence is not fixed, so a time window would measure something else.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counters shared between the interrupt and the cooperative loop.
pub struct PlaybackStats {
    /// Ticks seen while a sound was attached.
    usage_ticks: AtomicU32,

    /// Ticks that found the buffer empty while output was enabled.
    underruns: AtomicU32,

    /// Physical DAC writes (changed values only).
    dac_writes: AtomicU32,
}

impl PlaybackStats {
    pub const fn new() -> Self {
        Self {
            usage_ticks: AtomicU32::new(0),
            underruns: AtomicU32::new(0),
            dac_writes: AtomicU32::new(0),
        }
    }

    #[inline]
    pub(crate) fn record_usage_tick(&self) {
        self.usage_ticks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_underrun(&self) {
        self.underruns.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dac_write(&self) {
        self.dac_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Usage counter. Wraps after ~24 hours of continuous playback.
    #[inline]
    pub fn usage_ticks(&self) -> u32 {
        self.usage_ticks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn underruns(&self) -> u32 {
        self.underruns.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dac_writes(&self) -> u32 {
        self.dac_writes.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    #[inline]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            usage_ticks: self.usage_ticks(),
            underruns: self.underruns(),
            dac_writes: self.dac_writes(),
        }
    }
}

impl Default for PlaybackStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub usage_ticks: u32,
    pub underruns: u32,
    pub dac_writes: u32,
}

/// One-shot average buffer usage over a window of loop calls.
///
/// The call made after `window` earlier calls reports `usage / window`,
/// the running usage counter spread over the loop iterations, and then the
/// probe goes quiet for good. Ticks counted before the first call are
/// included.
#[derive(Debug, Clone)]
pub struct UsageProbe {
    window: u32,
    calls: u32,
    reported: bool,
}

impl UsageProbe {
    /// `window` must be non-zero (checked by `EngineConfig::validate`).
    pub const fn new(window: u32) -> Self {
        Self {
            window,
            calls: 0,
            reported: false,
        }
    }

    /// Feed the current usage counter. Returns the average exactly once.
    pub fn sample(&mut self, usage_ticks: u32) -> Option<u32> {
        if self.reported {
            return None;
        }

        if self.calls == self.window {
            self.reported = true;
            return Some(usage_ticks / self.window.max(1));
        }

        self.calls += 1;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counters() {
        let stats = PlaybackStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());

        stats.record_usage_tick();
        stats.record_usage_tick();
        stats.record_underrun();
        stats.record_dac_write();

        let snap = stats.snapshot();
        assert_eq!(snap.usage_ticks, 2);
        assert_eq!(snap.underruns, 1);
        assert_eq!(snap.dac_writes, 1);
    }

    #[test]
    fn test_probe_reports_once_after_window() {
        let mut probe = UsageProbe::new(4);

        // 4 calls fill the window; the 5th (index 4) reports
        assert_eq!(probe.sample(10), None);
        assert_eq!(probe.sample(20), None);
        assert_eq!(probe.sample(30), None);
        assert_eq!(probe.sample(40), None);
        assert_eq!(probe.sample(48), Some(12));

        assert_eq!(probe.sample(10_000), None);
        assert_eq!(probe.sample(20_000), None);
    }

    #[test]
    fn test_probe_counts_ticks_before_first_call() {
        let mut probe = UsageProbe::new(2);
        assert_eq!(probe.sample(1000), None);
        assert_eq!(probe.sample(1000), None);
        assert_eq!(probe.sample(1000), Some(500));
    }
}
