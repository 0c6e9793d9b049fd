//! DAC output for the speaker amplifier.
//!
//! On ESP-IDF this wraps the oneshot DAC driver. The handle is kept in an
//! `AtomicPtr` so the same object can be written from the timer interrupt
//! and connected/released from the main loop.

/// 8-bit analog output.
///
/// `write` is called from the timer interrupt and must not block.
/// `connect`/`release` are only called from the cooperative context while
/// the interrupt is not writing (output disabled).
pub trait DacOutput: Sync {
    /// Drive the output to `value` (0 = 0 V, 255 = full scale).
    fn write(&self, value: u8);

    /// Route the pin to the DAC.
    fn connect(&self);

    /// Put the pin back into high-impedance input mode.
    fn release(&self);
}

impl<T: DacOutput + ?Sized> DacOutput for &T {
    #[inline]
    fn write(&self, value: u8) {
        (**self).write(value)
    }

    fn connect(&self) {
        (**self).connect()
    }

    fn release(&self) {
        (**self).release()
    }
}

/// Hardware DAC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DacChannel {
    Channel0,
    Channel1,
}

#[cfg(feature = "esp32")]
const DAC_PINS: [u8; 2] = [25, 26];

#[cfg(not(feature = "esp32"))]
const DAC_PINS: [u8; 2] = [17, 18];

impl DacChannel {
    /// Map a GPIO number to its DAC channel.
    pub const fn for_gpio(pin: u8) -> Option<Self> {
        if pin == DAC_PINS[0] {
            Some(Self::Channel0)
        } else if pin == DAC_PINS[1] {
            Some(Self::Channel1)
        } else {
            None
        }
    }

    /// GPIO number of this channel.
    pub const fn gpio(self) -> u8 {
        match self {
            Self::Channel0 => DAC_PINS[0],
            Self::Channel1 => DAC_PINS[1],
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::EspDac;

#[cfg(target_os = "espidf")]
mod esp {
    use core::ptr;
    use core::sync::atomic::{AtomicPtr, Ordering};

    use esp_idf_svc::sys::{
        dac_channel_t_DAC_CHAN_0, dac_channel_t_DAC_CHAN_1, dac_oneshot_config_t,
        dac_oneshot_del_channel, dac_oneshot_new_channel, dac_oneshot_output_voltage,
        dac_oneshot_s, esp,
    };

    use super::{DacChannel, DacOutput};

    /// Oneshot DAC driver bound to one channel.
    pub struct EspDac {
        channel: DacChannel,
        handle: AtomicPtr<dac_oneshot_s>,
    }

    impl EspDac {
        /// Bind to `channel`. Const so engine cores can live in a `static`.
        /// The pin stays released (high-impedance) until
        /// [`DacOutput::connect`].
        pub const fn on_channel(channel: DacChannel) -> Self {
            Self {
                channel,
                handle: AtomicPtr::new(ptr::null_mut()),
            }
        }
    }

    impl DacOutput for EspDac {
        #[inline]
        fn write(&self, value: u8) {
            let handle = self.handle.load(Ordering::Acquire);
            if !handle.is_null() {
                // SAFETY: handle came from dac_oneshot_new_channel and is only
                // deleted by release(), which never runs while the ISR writes.
                unsafe {
                    dac_oneshot_output_voltage(handle, value);
                }
            }
        }

        fn connect(&self) {
            if !self.handle.load(Ordering::Acquire).is_null() {
                return;
            }

            let config = dac_oneshot_config_t {
                chan_id: match self.channel {
                    DacChannel::Channel0 => dac_channel_t_DAC_CHAN_0,
                    DacChannel::Channel1 => dac_channel_t_DAC_CHAN_1,
                },
            };
            let mut handle = ptr::null_mut();

            // SAFETY: config and handle outlive the call.
            match esp!(unsafe { dac_oneshot_new_channel(&config, &mut handle) }) {
                Ok(()) => self.handle.store(handle, Ordering::Release),
                Err(e) => log::warn!("DAC GPIO{} connect failed: {}", self.channel.gpio(), e),
            }
        }

        fn release(&self) {
            let handle = self.handle.swap(ptr::null_mut(), Ordering::AcqRel);
            if !handle.is_null() {
                // SAFETY: handle was created by connect() and is now unreachable.
                unsafe {
                    dac_oneshot_del_channel(handle);
                }
            }
        }
    }

    // SAFETY: the handle is only dereferenced by the driver, which guards
    // the channel registers with its own spinlock.
    unsafe impl Sync for EspDac {}
    unsafe impl Send for EspDac {}
}
