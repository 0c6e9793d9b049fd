//! ShyGuy firmware - main entry point
//!
//! Boots the DAC audio engine and plays the face sounds:
//! 1. Logging to UART via the lock-free log ring
//! 2. 50 kHz timer ISR draining the playback buffer to the DAC
//! 3. Main loop: fill buffer, trigger sounds, drain logs
//!
//! Eye, gaze and servo animation share the main loop but never touch the
//! audio engine beyond its public calls.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
#[no_mangle]
fn main() {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "{}: firmware image, build for an ESP-IDF target",
        env!("VERSION_STRING")
    );
}

#[cfg(target_os = "espidf")]
mod firmware {
    extern crate alloc;

    use alloc::vec;
    use core::fmt;

    use esp_idf_svc::hal::delay::{Delay, FreeRtos};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::sys::{self as esp_idf_sys, EspError};

    use shyguy_audio::audio::{render_sweep, AudioCore, AudioEngine, WavSample};
    use shyguy_audio::config::{ConfigError, EngineConfig, WAV_HEADER_LEN};
    use shyguy_audio::hal::dac::{DacChannel, EspDac};
    use shyguy_audio::hal::timer::EspTickTimer;
    use shyguy_audio::hal::HalError;
    use shyguy_audio::log_globals::{init_logging, timestamp_us, LOG_STREAM};
    use shyguy_audio::uart_logger::{drain_to_uart, init_uart_logger, UartLoggerConfig};

    const CONFIG: EngineConfig = EngineConfig::DEFAULT;

    const DAC_CHANNEL: DacChannel = match DacChannel::for_gpio(CONFIG.dac_pin) {
        Some(channel) => channel,
        None => panic!("EngineConfig::DEFAULT.dac_pin is not a DAC pin"),
    };

    // Shared with the timer ISR for the whole program lifetime.
    static AUDIO: AudioCore<EspDac> = AudioCore::new(EspDac::on_channel(DAC_CHANNEL));

    /// Built-in sounds are rendered at this rate and upsampled by the engine.
    const SOUND_RATE_HZ: u32 = 16_000;

    /// Pause between face sounds.
    const SOUND_INTERVAL_US: i64 = 6_000_000;

    #[derive(Debug)]
    enum BootError {
        Hal(HalError),
        Config(ConfigError),
        Esp(EspError),
    }

    impl From<HalError> for BootError {
        fn from(e: HalError) -> Self {
            BootError::Hal(e)
        }
    }

    impl From<ConfigError> for BootError {
        fn from(e: ConfigError) -> Self {
            BootError::Config(e)
        }
    }

    impl From<EspError> for BootError {
        fn from(e: EspError) -> Self {
            BootError::Esp(e)
        }
    }

    impl fmt::Display for BootError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                BootError::Hal(e) => write!(f, "{}", e),
                BootError::Config(e) => write!(f, "config: {}", e),
                BootError::Esp(e) => write!(f, "ESP-IDF: {}", e),
            }
        }
    }

    pub fn run() {
        esp_idf_sys::link_patches();

        // Only fails if a logger is already installed; records still reach
        // that one, they just bypass the UART ring.
        if let Err(e) = init_logging(log::LevelFilter::Info) {
            log::warn!("ring logger not installed: {}", e);
        }

        if let Err(e) = start() {
            log::error!("boot failed: {}", e);
        }

        // Nothing left to drive; keep the task alive for the watchdog.
        loop {
            FreeRtos::delay_ms(1000);
        }
    }

    fn start() -> Result<(), BootError> {
        let peripherals = Peripherals::take()?;

        let uart_config = UartLoggerConfig::default();
        #[cfg(feature = "esp32")]
        let tx_pin = peripherals.pins.gpio1;
        #[cfg(not(feature = "esp32"))]
        let tx_pin = peripherals.pins.gpio43;
        let mut uart = init_uart_logger(peripherals.uart0, tx_pin, &uart_config)?;

        log::info!("{}", env!("VERSION_STRING"));

        // Rendered once; the engine only borrows them.
        let mut hello = vec![0u8; WAV_HEADER_LEN + 4_800];
        render_sweep(&mut hello, SOUND_RATE_HZ, 600, 1_800, 320);
        let mut shy = vec![0u8; WAV_HEADER_LEN + 6_400];
        render_sweep(&mut shy, SOUND_RATE_HZ, 1_400, 400, 480);

        let sounds = [WavSample::from_wav(&hello), WavSample::from_wav(&shy)];

        let consumer = AUDIO.consumer();
        let mut timer = EspTickTimer::new(peripherals.timer00, move || consumer.tick())?;

        let mut engine = AudioEngine::new(&AUDIO, Delay::new_default(), CONFIG)?;
        engine.begin(&mut timer)?;
        engine.fill_buffer();
        engine.enable(true);

        let mut next_sound = 0;
        let mut next_at = timestamp_us();
        let mut reported_underruns = 0;

        loop {
            engine.fill_buffer();
            engine.average_usage();

            let now = timestamp_us();
            if now >= next_at && !engine.is_playing() {
                engine.play(&sounds[next_sound]);
                next_sound = (next_sound + 1) % sounds.len();
                next_at = now + SOUND_INTERVAL_US;
            }

            let underruns = engine.stats().underruns();
            if underruns != reported_underruns {
                log::warn!("buffer underrun ({} total)", underruns);
                reported_underruns = underruns;
            }

            drain_to_uart(&mut uart, &LOG_STREAM, uart_config.batch);

            // Yield one tick; the buffer holds ~80 ms.
            FreeRtos::delay_ms(1);
        }
    }
}
