//! Hardware tick timer driving the DAC interrupt.

/// Periodic timer that invokes the timer consumer.
///
/// The callback is bound when the timer is constructed; `start` only sets
/// the rate and arms the interrupt.
pub trait TickTimer {
    type Error;

    /// Fire the bound callback `hz` times per second, auto-reloading.
    fn start(&mut self, hz: u32) -> Result<(), Self::Error>;
}

#[cfg(target_os = "espidf")]
pub use esp::EspTickTimer;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::timer::{config::Config, Timer, TimerDriver};

    use super::TickTimer;
    use crate::hal::HalError;

    /// Hardware timer group timer with an ISR callback.
    ///
    /// The default divider gives a 1 MHz count, so 50 kHz is an alarm
    /// every 20 counts.
    pub struct EspTickTimer<'d, F> {
        driver: TimerDriver<'d>,
        callback: Option<F>,
    }

    impl<'d, F> EspTickTimer<'d, F>
    where
        F: FnMut() + Send + 'static,
    {
        pub fn new<T: Timer>(
            timer: impl Peripheral<P = T> + 'd,
            callback: F,
        ) -> Result<Self, HalError> {
            let driver = TimerDriver::new(timer, &Config::new().auto_reload(true))?;
            Ok(Self {
                driver,
                callback: Some(callback),
            })
        }
    }

    impl<'d, F> TickTimer for EspTickTimer<'d, F>
    where
        F: FnMut() + Send + 'static,
    {
        type Error = HalError;

        fn start(&mut self, hz: u32) -> Result<(), HalError> {
            self.driver.enable(false)?;
            self.driver.set_counter(0)?;
            self.driver.set_alarm(self.driver.tick_hz() / hz.max(1) as u64)?;

            if let Some(callback) = self.callback.take() {
                // SAFETY: the callback only touches lock-free engine state
                // and never blocks (see TimerConsumer::tick).
                unsafe {
                    self.driver.subscribe(callback)?;
                }
            }

            self.driver.enable_interrupt()?;
            self.driver.enable_alarm(true)?;
            self.driver.enable(true)?;
            Ok(())
        }
    }
}
