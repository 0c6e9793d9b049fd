//! Audio engine lifecycle and producer tests

mod common;

use common::{wav, Event, MockDelay, MockTimer, Recorder, TEST_CONFIG};
use shyguy_audio::audio::{AudioCore, AudioEngine, WavSample};
use shyguy_audio::config::{ConfigError, EngineConfig, OUTPUT_RATE_HZ, SILENCE};

type TestCore<'a> = AudioCore<&'a Recorder, 32>;

#[test]
fn test_new_rejects_invalid_config() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);

    let config = EngineConfig {
        ramp_steps: 0,
        ..TEST_CONFIG
    };
    assert_eq!(
        AudioEngine::new(&core, MockDelay(&rec), config).err(),
        Some(ConfigError::ZeroRampSteps)
    );

    let config = EngineConfig {
        usage_window: 0,
        ..TEST_CONFIG
    };
    assert_eq!(
        AudioEngine::new(&core, MockDelay(&rec), config).err(),
        Some(ConfigError::ZeroUsageWindow)
    );

    let config = EngineConfig {
        dac_pin: 4,
        ..TEST_CONFIG
    };
    assert_eq!(
        AudioEngine::new(&core, MockDelay(&rec), config).err(),
        Some(ConfigError::NotADacPin(4))
    );
}

#[test]
fn test_begin_starts_timer_and_parks_output() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    let mut timer = MockTimer::default();

    engine.begin(&mut timer).unwrap();

    assert_eq!(timer.started_hz, Some(OUTPUT_RATE_HZ));
    assert_eq!(
        rec.events(),
        vec![Event::Write(0), Event::Release, Event::DelayMs(1)]
    );
    assert!(!engine.is_enabled());
}

#[test]
fn test_begin_propagates_timer_error() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    let mut timer = MockTimer {
        fail: true,
        ..MockTimer::default()
    };

    assert_eq!(engine.begin(&mut timer), Err("timer busy"));
    assert!(rec.events().is_empty());
}

#[test]
fn test_enable_ramps_up_before_isr_runs() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    engine.enable(true);

    assert!(engine.is_enabled());
    assert_eq!(
        rec.events(),
        vec![
            Event::Connect,
            Event::Write(0),
            Event::DelayMs(10),
            Event::Write(31),
            Event::DelayMs(10),
            Event::Write(63),
            Event::DelayMs(10),
            Event::Write(95),
            Event::DelayMs(10),
            Event::Write(SILENCE),
        ]
    );

    // Already enabled: nothing happens
    rec.clear();
    engine.enable(true);
    assert!(rec.events().is_empty());
}

#[test]
fn test_disable_ramps_down_from_last_value() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    engine.enable(true);

    core.buffer().fill(200);
    core.consumer().tick();
    rec.clear();

    engine.enable(false);

    assert!(!engine.is_enabled());
    assert_eq!(
        rec.events(),
        vec![
            Event::Write(200),
            Event::DelayMs(10),
            Event::Write(150),
            Event::DelayMs(10),
            Event::Write(100),
            Event::DelayMs(10),
            Event::Write(50),
            Event::DelayMs(10),
            Event::Write(0),
            Event::Release,
        ]
    );

    rec.clear();
    engine.enable(false);
    assert!(rec.events().is_empty());
}

#[test]
fn test_fill_buffer_without_sound_fills_silence() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    assert_eq!(engine.fill_buffer(), 31);
    assert_eq!(engine.fill_buffer(), 0);

    let buffer = core.buffer();
    while let Some(v) = buffer.try_consume() {
        assert_eq!(v, SILENCE);
    }
}

#[test]
fn test_fill_buffer_tops_up_consumed_slots() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    engine.fill_buffer();

    for _ in 0..7 {
        core.buffer().try_consume();
    }
    assert_eq!(engine.fill_buffer(), 7);
    assert_eq!(core.buffer().len(), 31);
}

#[test]
fn test_play_streams_sound_then_silence() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let data = wav(50_000, &[1, 2, 3, 4, 5]);
    let sound = WavSample::new(&data, data.len());
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    engine.play(&sound);
    assert!(engine.is_playing());
    engine.fill_buffer();
    assert!(!engine.is_playing());

    let buffer = core.buffer();
    let played: Vec<u8> = (0..8).filter_map(|_| buffer.try_consume()).collect();
    assert_eq!(played, vec![1, 2, 3, 4, 5, SILENCE, SILENCE, SILENCE]);
}

#[test]
fn test_play_preempts_current_sound() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let long = wav(50_000, &[9; 100]);
    let short = wav(50_000, &[4, 4]);
    let first = WavSample::new(&long, long.len());
    let second = WavSample::new(&short, short.len());
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    engine.play(&first);
    engine.fill_buffer();
    assert!(engine.is_playing());

    engine.play(&second);
    assert!(first.is_completed());
    assert!(!second.is_completed());
    assert!(core::ptr::eq(engine.active().unwrap(), &second));

    // Drain the 31 bytes of the first sound, then refill from the second
    while core.buffer().try_consume().is_some() {}
    engine.fill_buffer();
    assert_eq!(core.buffer().try_consume(), Some(4));
    assert_eq!(core.buffer().try_consume(), Some(4));
    assert_eq!(core.buffer().try_consume(), Some(SILENCE));
}

#[test]
fn test_replay_same_sound_restarts() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let data = wav(50_000, &[11; 100]);
    let sound = WavSample::new(&data, data.len());
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    engine.play(&sound);
    engine.fill_buffer();
    assert_eq!(sound.position(), 44 + 31);

    engine.play(&sound);
    assert_eq!(sound.position(), 44);
    assert!(engine.is_playing());
}

#[test]
fn test_stop_lets_buffered_bytes_drain() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let data = wav(50_000, &[33; 100]);
    let sound = WavSample::new(&data, data.len());
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    engine.play(&sound);
    engine.fill_buffer();
    engine.stop();

    assert!(!engine.is_playing());
    assert!(sound.is_completed());

    // Already buffered bytes are still there
    assert_eq!(core.buffer().len(), 31);
    for _ in 0..5 {
        assert_eq!(core.buffer().try_consume(), Some(33));
    }

    // New fills are silence
    assert_eq!(engine.fill_buffer(), 5);
    for _ in 0..26 {
        assert_eq!(core.buffer().try_consume(), Some(33));
    }
    for _ in 0..5 {
        assert_eq!(core.buffer().try_consume(), Some(SILENCE));
    }
}

#[test]
fn test_stop_without_sound_is_noop() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();

    engine.stop();
    assert!(!engine.is_playing());
    assert!(engine.active().is_none());
}

#[test]
fn test_average_usage_reports_once() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let data = wav(50_000, &[1; 10]);
    let sound = WavSample::new(&data, data.len());
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    engine.enable(true);
    engine.play(&sound);

    let consumer = core.consumer();
    for _ in 0..50 {
        assert_eq!(engine.average_usage(), None);
        for _ in 0..12 {
            consumer.tick();
        }
        engine.fill_buffer();
    }

    assert_eq!(engine.stats().usage_ticks(), 600);
    assert_eq!(engine.average_usage(), Some(12));
    assert_eq!(engine.average_usage(), None);
    assert_eq!(engine.average_usage(), None);
}

#[test]
fn test_average_usage_zero_without_sound() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    engine.enable(true);

    let consumer = core.consumer();
    for _ in 0..50 {
        assert_eq!(engine.average_usage(), None);
        consumer.tick();
    }
    assert_eq!(engine.average_usage(), Some(0));
}

#[test]
fn test_average_usage_includes_ticks_before_first_call() {
    let rec = Recorder::new();
    let core: TestCore = AudioCore::new(&rec);
    let data = wav(50_000, &[1; 10]);
    let sound = WavSample::new(&data, data.len());
    let mut engine = AudioEngine::new(&core, MockDelay(&rec), TEST_CONFIG).unwrap();
    engine.enable(true);
    engine.play(&sound);

    // Setup ticks land before the main loop starts calling the diagnostic
    let consumer = core.consumer();
    for _ in 0..1000 {
        consumer.tick();
    }

    for _ in 0..50 {
        assert_eq!(engine.average_usage(), None);
    }
    assert_eq!(engine.average_usage(), Some(20));
    assert_eq!(engine.average_usage(), None);
}
