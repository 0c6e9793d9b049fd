//! Recording mocks shared by the engine tests.

#![allow(dead_code)]

use std::sync::Mutex;

use embedded_hal::delay::DelayNs;
use shyguy_audio::config::{EngineConfig, WAV_HEADER_LEN};
use shyguy_audio::{DacOutput, TickTimer};

/// Everything the engine did to the outside world, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write(u8),
    Connect,
    Release,
    DelayMs(u32),
}

/// DAC and delay recorder. Hand `&Recorder` to the core as its DAC and
/// `MockDelay(&recorder)` to the engine.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn writes(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(v) => Some(v),
                _ => None,
            })
            .collect()
    }
}

impl DacOutput for Recorder {
    fn write(&self, value: u8) {
        self.push(Event::Write(value));
    }

    fn connect(&self) {
        self.push(Event::Connect);
    }

    fn release(&self) {
        self.push(Event::Release);
    }
}

pub struct MockDelay<'a>(pub &'a Recorder);

impl DelayNs for MockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.push(Event::DelayMs(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::DelayMs(ms));
    }
}

/// Tick timer that only remembers how it was started.
#[derive(Default)]
pub struct MockTimer {
    pub started_hz: Option<u32>,
    pub fail: bool,
}

impl TickTimer for MockTimer {
    type Error = &'static str;

    fn start(&mut self, hz: u32) -> Result<(), Self::Error> {
        if self.fail {
            return Err("timer busy");
        }
        self.started_hz = Some(hz);
        Ok(())
    }
}

pub const TEST_CONFIG: EngineConfig = EngineConfig {
    dac_pin: 17,
    ramp_steps: 4,
    ramp_step_ms: 10,
    settle_ms: 1,
    usage_window: 50,
};

/// Header-prefixed sound with the given samples.
pub fn wav(sample_rate: u32, samples: &[u8]) -> Vec<u8> {
    let mut data = shyguy_audio::audio::pcm8_header(sample_rate, samples.len() as u32).to_vec();
    data.extend_from_slice(samples);
    assert_eq!(data.len(), WAV_HEADER_LEN + samples.len());
    data
}
