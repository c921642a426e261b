//! Circular-buffer delay line with fractional (linear) interpolation.
//!
//! The building block behind delay nodes and the [`FeedbackDelay`] kernel.
//! Delay time may change every sample; reads interpolate between the two
//! neighbouring samples so sweeping the time does not step.
//!
//! [`FeedbackDelay`]: crate::FeedbackDelay

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Interpolated delay line using a circular buffer (heap-allocated).
///
/// The buffer is allocated during construction and never reallocates, so no
/// allocation occurs while rendering.
///
/// # Example
///
/// ```rust
/// use efflux_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::from_time(48000.0, 0.05);
/// delay.write(1.0);
/// assert_eq!(delay.read(0.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a delay line holding `max_delay_samples` samples (at least one).
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1)],
            write_pos: 0,
        }
    }

    /// Creates a delay line from sample rate and max delay time in seconds.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let max_samples = (sample_rate * max_seconds.max(0.0)) as usize + 2;
        Self::new(max_samples)
    }

    /// Reads a delayed sample.
    ///
    /// `delay_samples` counts back from the most recently written sample, so a
    /// delay of 0 returns the last [`write`](Self::write). Values beyond the
    /// capacity are clamped.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay_clamped = delay_samples.clamp(0.0, (len - 1) as f32);

        let delay_int = delay_clamped as usize;
        let frac = delay_clamped - delay_int as f32;

        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let next_pos = (read_pos + len - 1) % len;
        let a = self.buffer[read_pos];
        let b = self.buffer[next_pos];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads `delay_samples` behind the incoming sample, then writes it.
    ///
    /// Unlike [`read`](Self::read) this counts from the sample being written,
    /// so a delay of `n` returns the input from exactly `n` calls ago. A delay
    /// below one sample is clamped to one.
    #[inline]
    pub fn read_write(&mut self, sample: f32, delay_samples: f32) -> f32 {
        let output = self.read(delay_samples - 1.0);
        self.write(sample);
        output
    }

    /// Clears the delay line (sets all samples to 0).
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Returns the capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
