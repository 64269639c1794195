//! Averaged analog sampling

use crate::config::{CalibrationConfig, CHANNELS};
use crate::domain::Channel;
use crate::ports::{AnalogSource, Clock};

/// Reads a channel several times and averages the conversions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalogSampler {
    samples: u16,
    settle_delay_ms: u32,
}

impl AnalogSampler {
    pub const fn new(samples: u16, settle_delay_ms: u32) -> Self {
        Self {
            samples: if samples == 0 { 1 } else { samples },
            settle_delay_ms,
        }
    }

    pub const fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(config.effective_samples(), config.settle_delay_ms)
    }

    /// Mean of `samples` conversions on `channel`, waiting the settle delay
    /// after each one
    pub async fn sample<A: AnalogSource, C: Clock>(
        &self,
        source: &mut A,
        clock: &mut C,
        channel: Channel,
    ) -> f32 {
        let mut sum: u32 = 0;
        for _ in 0..self.samples {
            sum += source.read_raw(channel).await as u32;
            if self.settle_delay_ms > 0 {
                clock.delay_ms(self.settle_delay_ms).await;
            }
        }
        sum as f32 / self.samples as f32
    }

    /// One averaged reading per channel, in port order
    pub async fn sample_all<A: AnalogSource, C: Clock>(
        &self,
        source: &mut A,
        clock: &mut C,
    ) -> [f32; CHANNELS] {
        let mut raw = [0.0; CHANNELS];
        for channel in Channel::ALL {
            raw[channel.index()] = self.sample(source, clock, channel).await;
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::RecordingClock;
    use embassy_futures::block_on;

    /// Cycles through fixed conversions per channel
    struct Pattern {
        values: [[u16; 4]; CHANNELS],
        next: [usize; CHANNELS],
    }

    impl AnalogSource for Pattern {
        async fn read_raw(&mut self, channel: Channel) -> u16 {
            let j = channel.index();
            let v = self.values[j][self.next[j] % 4];
            self.next[j] += 1;
            v
        }
    }

    #[test]
    fn test_average_and_settle_time() {
        let mut source = Pattern {
            values: [[100, 102, 98, 100]; CHANNELS],
            next: [0; CHANNELS],
        };
        let mut clock = RecordingClock::new();
        let sampler = AnalogSampler::new(20, 2);

        let v = block_on(sampler.sample(&mut source, &mut clock, Channel::ALL[1]));
        assert_eq!(v, 100.0);
        assert_eq!(clock.elapsed_ms(), 40);
    }

    #[test]
    fn test_sample_all_uses_every_channel() {
        let mut values = [[0u16; 4]; CHANNELS];
        for (j, v) in values.iter_mut().enumerate() {
            *v = [j as u16 * 100 + 1, j as u16 * 100 + 2, j as u16 * 100 + 3, j as u16 * 100 + 4];
        }
        let mut source = Pattern {
            values,
            next: [0; CHANNELS],
        };
        let mut clock = RecordingClock::new();
        let sampler = AnalogSampler::from_config(&CalibrationConfig::fast());

        let raw = block_on(sampler.sample_all(&mut source, &mut clock));
        for (j, x) in raw.iter().enumerate() {
            assert_eq!(*x, j as f32 * 100.0 + 2.5);
        }
        assert_eq!(clock.elapsed_ms(), 0);
    }
}
