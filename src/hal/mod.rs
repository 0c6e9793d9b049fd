//! Hardware Abstraction Layer for the ShyGuy audio engine.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Engine logic stays in `audio`, HAL is just I/O.
//!
//! The traits here are what the engine is generic over, so the whole
//! pipeline runs on the host against recording mocks.

pub mod dac;
pub mod timer;

pub use dac::{DacChannel, DacOutput};
pub use timer::TickTimer;

#[cfg(target_os = "espidf")]
use core::fmt;

/// HAL setup error
#[cfg(target_os = "espidf")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// ESP-IDF driver call failed
    Esp(esp_idf_svc::sys::EspError),
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for HalError {
    fn from(e: esp_idf_svc::sys::EspError) -> Self {
        HalError::Esp(e)
    }
}

#[cfg(target_os = "espidf")]
impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Esp(e) => write!(f, "ESP-IDF error: {}", e),
        }
    }
}
