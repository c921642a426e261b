//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.

use libm::powf;

/// Flush denormal (subnormal) floats to zero.
///
/// Denormals appear when a feedback loop decays toward zero and can cost a
/// large slowdown on most architectures. Values below 1e-20 become zero,
/// leaving margin before the IEEE 754 subnormal range begins.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Convert a time in seconds to a (fractional) sample count.
#[inline]
pub fn seconds_to_samples(seconds: f32, sample_rate: f32) -> f32 {
    seconds * sample_rate
}

/// Convert a MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
///
/// # Example
/// ```rust
/// use efflux_core::midi_to_hz;
///
/// assert!((midi_to_hz(69) - 440.0).abs() < 1e-3);
/// assert!((midi_to_hz(81) - 880.0).abs() < 1e-2);
/// ```
#[inline]
pub fn midi_to_hz(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Apply a detune in cents to a frequency.
#[inline]
pub fn detune_hz(frequency: f32, cents: f32) -> f32 {
    if cents == 0.0 {
        frequency
    } else {
        frequency * powf(2.0, cents / 1200.0)
    }
}
