//! Biquad (bi-quadratic) filter structure.
//!
//! Provides a generic second-order IIR filter and the coefficient formulas for
//! the eight responses a filter node can select (see [`FilterType`]).
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

/// Filter response selected on a filter node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Second-order lowpass, resonant at the cutoff.
    #[default]
    Lowpass,
    /// Second-order highpass, resonant at the cutoff.
    Highpass,
    /// Constant 0 dB peak bandpass.
    Bandpass,
    /// Low shelf, boosts or cuts below the frequency by the gain in dB.
    Lowshelf,
    /// High shelf, boosts or cuts above the frequency by the gain in dB.
    Highshelf,
    /// Peaking EQ around the frequency.
    Peaking,
    /// Band reject.
    Notch,
    /// Flat magnitude, phase shift around the frequency.
    Allpass,
}

impl FilterType {
    /// Every filter type, in declaration order.
    pub const ALL: [FilterType; 8] = [
        FilterType::Lowpass,
        FilterType::Highpass,
        FilterType::Bandpass,
        FilterType::Lowshelf,
        FilterType::Highshelf,
        FilterType::Peaking,
        FilterType::Notch,
        FilterType::Allpass,
    ];

    /// Lowercase name, as used in preset files.
    pub fn name(self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
            FilterType::Bandpass => "bandpass",
            FilterType::Lowshelf => "lowshelf",
            FilterType::Highshelf => "highshelf",
            FilterType::Peaking => "peaking",
            FilterType::Notch => "notch",
            FilterType::Allpass => "allpass",
        }
    }

    /// Parses a name produced by [`name()`](Self::name), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for FilterType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Sets coefficients from a `(b0, b1, b2, a0, a1, a2)` tuple.
    pub fn set_coefficient_tuple(&mut self, c: (f32, f32, f32, f32, f32, f32)) {
        self.set_coefficients(c.0, c.1, c.2, c.3, c.4, c.5);
    }

    /// Processes a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::math::flush_denormal(output);

        output
    }

    /// Clears the filter state without touching coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared intermediate terms: (cos ω, alpha).
#[inline]
fn omega_terms(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (cosf(omega), sinf(omega) / (2.0 * q))
}

/// Calculates coefficients for any [`FilterType`].
///
/// `gain_db` is only used by the shelf and peaking responses.
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn coefficients(
    filter_type: FilterType,
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    match filter_type {
        FilterType::Lowpass => lowpass_coefficients(frequency, q, sample_rate),
        FilterType::Highpass => highpass_coefficients(frequency, q, sample_rate),
        FilterType::Bandpass => bandpass_coefficients(frequency, q, sample_rate),
        FilterType::Lowshelf => lowshelf_coefficients(frequency, gain_db, sample_rate),
        FilterType::Highshelf => highshelf_coefficients(frequency, gain_db, sample_rate),
        FilterType::Peaking => peaking_coefficients(frequency, q, gain_db, sample_rate),
        FilterType::Notch => notch_coefficients(frequency, q, sample_rate),
        FilterType::Allpass => allpass_coefficients(frequency, q, sample_rate),
    }
}

/// Calculates low-pass filter coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `frequency` - Cutoff frequency in Hz
/// * `q` - Q factor (0.707 for Butterworth response)
/// * `sample_rate` - Sample rate in Hz
pub fn lowpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    let b1 = 1.0 - cos_omega;
    (
        b1 / 2.0,
        b1,
        b1 / 2.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Calculates high-pass filter coefficients using the RBJ cookbook formula.
pub fn highpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    let b0 = (1.0 + cos_omega) / 2.0;
    (
        b0,
        -(1.0 + cos_omega),
        b0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Calculates band-pass filter coefficients (constant 0 dB peak gain).
pub fn bandpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
}

/// Calculates notch (band-reject) filter coefficients.
pub fn notch_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (
        1.0,
        -2.0 * cos_omega,
        1.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Calculates all-pass filter coefficients.
pub fn allpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (
        1.0 - alpha,
        -2.0 * cos_omega,
        1.0 + alpha,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Calculates peaking EQ coefficients.
///
/// # Arguments
///
/// * `frequency` - Center frequency in Hz
/// * `q` - Q factor (bandwidth = frequency / Q)
/// * `gain_db` - Boost (positive) or cut (negative) in dB
/// * `sample_rate` - Sample rate in Hz
pub fn peaking_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (
        1.0 + alpha * a,
        -2.0 * cos_omega,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_omega,
        1.0 - alpha / a,
    )
}

/// Calculates low-shelf coefficients with a shelf slope of 1.
pub fn lowshelf_coefficients(
    frequency: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let (cos_omega, alpha) = omega_terms(frequency, core::f32::consts::FRAC_1_SQRT_2, sample_rate);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;
    (
        a * ((a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
        a * ((a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha),
        (a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha,
        -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
        (a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha,
    )
}

/// Calculates high-shelf coefficients with a shelf slope of 1.
pub fn highshelf_coefficients(
    frequency: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let (cos_omega, alpha) = omega_terms(frequency, core::f32::consts::FRAC_1_SQRT_2, sample_rate);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;
    (
        a * ((a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
        a * ((a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha),
        (a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha,
        2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
        (a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(biquad: &mut Biquad, input: f32, samples: usize) -> f32 {
        let mut out = 0.0;
        for _ in 0..samples {
            out = biquad.process(input);
        }
        out
    }

    #[test]
    fn test_passthrough_default() {
        let mut biquad = Biquad::new();
        assert_eq!(biquad.process(0.5), 0.5);
        assert_eq!(biquad.process(-0.25), -0.25);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut biquad = Biquad::new();
        biquad.set_coefficient_tuple(lowpass_coefficients(1000.0, 0.707, 48000.0));
        let out = settle(&mut biquad, 1.0, 4800);
        assert!((out - 1.0).abs() < 0.01, "DC gain should be unity, got {out}");
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut biquad = Biquad::new();
        biquad.set_coefficient_tuple(highpass_coefficients(1000.0, 0.707, 48000.0));
        let out = settle(&mut biquad, 1.0, 4800);
        assert!(out.abs() < 0.01, "DC should be rejected, got {out}");
    }

    #[test]
    fn test_lowshelf_dc_gain_matches_db() {
        let mut biquad = Biquad::new();
        biquad.set_coefficient_tuple(lowshelf_coefficients(500.0, 6.0, 48000.0));
        let out = settle(&mut biquad, 1.0, 9600);
        let expected = powf(10.0, 6.0 / 20.0);
        assert!((out - expected).abs() < 0.02, "expected {expected}, got {out}");
    }

    #[test]
    fn test_allpass_unity_dc() {
        let mut biquad = Biquad::new();
        biquad.set_coefficient_tuple(allpass_coefficients(800.0, 1.0, 48000.0));
        let out = settle(&mut biquad, 1.0, 9600);
        assert!((out - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut biquad = Biquad::new();
        biquad.set_coefficient_tuple(lowpass_coefficients(200.0, 5.0, 48000.0));
        settle(&mut biquad, 1.0, 64);
        biquad.clear();
        assert_eq!(biquad.process(0.0), 0.0);
    }

    #[test]
    fn test_filter_type_names_round_trip() {
        for t in FilterType::ALL {
            assert_eq!(FilterType::from_name(t.name()), Some(t));
        }
        assert_eq!(FilterType::from_name("LOWPASS"), Some(FilterType::Lowpass));
        assert_eq!(FilterType::from_name("comb"), None);
    }
}
