//! Analog port - abstraction for raw ADC conversions
//!
//! This trait lets the sampler read thermistor inputs without knowing the
//! specific hardware (on-chip ADC, external converter, simulation).

use crate::domain::Channel;

/// Port for reading raw analog conversions
///
/// Hardware read failures are outside the calibrator's concern: an
/// implementation returns whatever value the converter produced.
///
/// # Example Implementation
///
/// ```ignore
/// struct RpAdc<'a> {
///     adc: Adc<'a, Blocking>,
///     inputs: [AdcChannel<'a>; CHANNELS],
/// }
///
/// impl<'a> AnalogSource for RpAdc<'a> {
///     async fn read_raw(&mut self, channel: Channel) -> u16 {
///         self.adc
///             .blocking_read(&mut self.inputs[channel.index()])
///             .unwrap_or(0)
///     }
/// }
/// ```
pub trait AnalogSource {
    /// Take one raw conversion on `channel`
    fn read_raw(&mut self, channel: Channel) -> impl core::future::Future<Output = u16>;
}

impl<T: AnalogSource + ?Sized> AnalogSource for &mut T {
    fn read_raw(&mut self, channel: Channel) -> impl core::future::Future<Output = u16> {
        (**self).read_raw(channel)
    }
}
