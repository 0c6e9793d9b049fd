//! Audio subsystem: interrupt-driven 8-bit DAC playback
//!
//! Architecture:
//! - `WavSample`: borrowed PCM + sample-and-hold conversion to 50 kHz
//! - `PlaybackBuffer`: 4000-byte SPSC ring, main loop → timer ISR
//! - `TimerConsumer`: 50 kHz ISR, one byte per tick, writes only on change
//! - `AudioEngine`: begin / enable / play / stop / fill_buffer / average_usage
//! - `ToneGen` + LUT: renders the built-in sounds at boot

pub mod buffer;
pub mod engine;
pub mod lut;
pub mod ramp;
pub mod timer;
pub mod tone;
pub mod wav;

pub use buffer::PlaybackBuffer;
pub use engine::{AudioCore, AudioEngine};
pub use lut::{LUT_SIZE, SINE_LUT};
pub use ramp::{Ramp, RampDirection};
pub use timer::TimerConsumer;
pub use tone::{render_sweep, ToneGen};
pub use wav::{pcm8_header, WavSample};
