//! DSP state held by each node and the per-block kernel that runs it.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::biquad::{Biquad, FilterType, coefficients};
use crate::delay::InterpolatedDelay;
use crate::feedback_delay::FeedbackDelay;
use crate::math::{detune_hz, seconds_to_samples};
use crate::oscillator::{Oscillator, Waveform};

use super::buffer::StereoBuffer;
use super::param::{AudioParam, ParamKind};

/// Most parameter slots any node kind exposes.
pub(crate) const MAX_PARAMS: usize = 4;

/// Block-level render state shared by every node.
pub(crate) struct RenderContext {
    /// Graph clock at the first sample of the block.
    pub frame: u64,
    pub len: usize,
    pub sample_rate: f32,
}

/// Filter node state.
pub(crate) struct FilterState {
    pub filter_type: FilterType,
    left: Biquad,
    right: Biquad,
    /// (frequency, q, gain_db) the biquads were last designed for.
    designed: Option<(f32, f32, f32)>,
}

impl FilterState {
    fn design(&mut self, frequency: f32, q: f32, gain_db: f32, sample_rate: f32) {
        let frequency = frequency.clamp(10.0, sample_rate * 0.49);
        if let Some((f, qq, g)) = self.designed
            && (f - frequency).abs() < 0.01
            && (qq - q).abs() < 1e-4
            && (g - gain_db).abs() < 1e-3
        {
            return;
        }
        let c = coefficients(self.filter_type, frequency, q, gain_db, sample_rate);
        self.left.set_coefficient_tuple(c);
        self.right.set_coefficient_tuple(c);
        self.designed = Some((frequency, q, gain_db));
    }

    /// Forces a redesign on the next sample (after a type change).
    pub fn invalidate(&mut self) {
        self.designed = None;
    }
}

/// Node DSP state, one variant per [`NodeKind`](super::NodeKind).
pub(crate) enum Processor {
    Destination,
    Gain,
    Delay {
        left: InterpolatedDelay,
        right: InterpolatedDelay,
    },
    Filter(FilterState),
    Oscillator(Oscillator),
    FeedbackDelay(FeedbackDelay),
}

impl Processor {
    pub fn gain(sample_rate: f32) -> (Self, Vec<AudioParam>) {
        (
            Processor::Gain,
            vec![AudioParam::new(ParamKind::Gain, sample_rate)],
        )
    }

    pub fn delay(sample_rate: f32, max_seconds: f32) -> (Self, Vec<AudioParam>) {
        (
            Processor::Delay {
                left: InterpolatedDelay::from_time(sample_rate, max_seconds),
                right: InterpolatedDelay::from_time(sample_rate, max_seconds),
            },
            vec![AudioParam::new(ParamKind::DelayTime, sample_rate).with_max(max_seconds)],
        )
    }

    pub fn filter(sample_rate: f32, filter_type: FilterType) -> (Self, Vec<AudioParam>) {
        (
            Processor::Filter(FilterState {
                filter_type,
                left: Biquad::new(),
                right: Biquad::new(),
                designed: None,
            }),
            vec![
                AudioParam::new(ParamKind::Frequency, sample_rate).with_default(350.0),
                AudioParam::new(ParamKind::Q, sample_rate),
                AudioParam::new(ParamKind::GainDb, sample_rate),
                AudioParam::new(ParamKind::Detune, sample_rate),
            ],
        )
    }

    pub fn oscillator(sample_rate: f32, waveform: Waveform) -> (Self, Vec<AudioParam>) {
        (
            Processor::Oscillator(Oscillator::new(sample_rate, waveform)),
            vec![
                AudioParam::new(ParamKind::Frequency, sample_rate),
                AudioParam::new(ParamKind::Detune, sample_rate),
            ],
        )
    }

    pub fn feedback_delay(sample_rate: f32, max_seconds: f32) -> (Self, Vec<AudioParam>) {
        (
            Processor::FeedbackDelay(FeedbackDelay::new(sample_rate, max_seconds)),
            vec![
                AudioParam::new(ParamKind::DelayTime, sample_rate)
                    .with_max(max_seconds)
                    .with_default(0.5),
                AudioParam::new(ParamKind::Feedback, sample_rate),
                AudioParam::new(ParamKind::Cutoff, sample_rate),
                AudioParam::new(ParamKind::Offset, sample_rate),
            ],
        )
    }

    /// Renders `ctx.len` samples from `input` into `output`.
    ///
    /// `modulation[k]` holds the summed modulation signal for `params[k]`.
    pub fn process(
        &mut self,
        ctx: &RenderContext,
        input: &StereoBuffer,
        params: &mut [AudioParam],
        modulation: &[Vec<f32>],
        output: &mut StereoBuffer,
    ) {
        let sr = ctx.sample_rate;
        match self {
            Processor::Destination => {
                output.left[..ctx.len].copy_from_slice(&input.left[..ctx.len]);
                output.right[..ctx.len].copy_from_slice(&input.right[..ctx.len]);
            }
            Processor::Gain => {
                for i in 0..ctx.len {
                    let gain = params[0].next(modulation[0][i]);
                    output.left[i] = input.left[i] * gain;
                    output.right[i] = input.right[i] * gain;
                }
            }
            Processor::Delay { left, right } => {
                for i in 0..ctx.len {
                    let delay = seconds_to_samples(params[0].next(modulation[0][i]), sr);
                    output.left[i] = left.read_write(input.left[i], delay);
                    output.right[i] = right.read_write(input.right[i], delay);
                }
            }
            Processor::Filter(state) => {
                for i in 0..ctx.len {
                    let frequency = detune_hz(
                        params[0].next(modulation[0][i]),
                        params[3].next(modulation[3][i]),
                    );
                    let q = params[1].next(modulation[1][i]);
                    let gain_db = params[2].next(modulation[2][i]);
                    state.design(frequency, q, gain_db, sr);
                    output.left[i] = state.left.process(input.left[i]);
                    output.right[i] = state.right.process(input.right[i]);
                }
            }
            Processor::Oscillator(osc) => {
                for i in 0..ctx.len {
                    let frequency = detune_hz(
                        params[0].next(modulation[0][i]),
                        params[1].next(modulation[1][i]),
                    );
                    let sample = osc.next(ctx.frame + i as u64, frequency);
                    output.left[i] = sample;
                    output.right[i] = sample;
                }
            }
            Processor::FeedbackDelay(delay) => {
                for i in 0..ctx.len {
                    let time = params[0].next(modulation[0][i]);
                    let feedback = params[1].next(modulation[1][i]);
                    let cutoff = params[2].next(modulation[2][i]);
                    let offset = params[3].next(modulation[3][i]);
                    let (l, r) = delay.process(
                        input.left[i],
                        input.right[i],
                        time,
                        feedback,
                        cutoff,
                        offset,
                    );
                    output.left[i] = l;
                    output.right[i] = r;
                }
            }
        }
    }
}
