//! Filter module: a biquad with an LFO on its cutoff.
//!
//! ```text
//!   lfo ──(enabled only)──► lfo_gain ──► filter.frequency
//!                                          │
//!              input ─────────────────► filter ─────► output
//! ```
//!
//! The LFO gain node scales the ±1 LFO signal to `depth% × base frequency`
//! Hz and stays wired to the cutoff for the module's lifetime. Enabling and
//! disabling the LFO only adds or removes the `lfo → lfo_gain` edge; the LFO
//! keeps oscillating while disconnected.
//!
//! If the LFO has been stopped (it is a one-shot source) a later enable
//! replaces it with a fresh, started oscillator instead of reviving it.

use efflux_core::{AudioGraph, FilterType, NodeId, OscillatorState, ParamKind, Waveform};
use tracing::debug;

use crate::error::Result;
use crate::factory::{
    DEFAULT_FILTER_FREQUENCY, DEFAULT_FILTER_Q, DEFAULT_FILTER_TYPE, DEFAULT_LFO_DEPTH,
    DEFAULT_LFO_SPEED, DEFAULT_LFO_WAVEFORM, create_filter_node, create_gain_node,
    create_oscillator, start_oscillation, stop_oscillation,
};

/// Complete filter configuration, as stored in an instrument preset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    /// Whether the filter stage is in the route.
    pub enabled: bool,
    /// Base cutoff in Hz.
    pub frequency: f32,
    /// Resonance.
    pub q: f32,
    /// LFO waveform, or `None` for no cutoff modulation.
    pub lfo: Option<Waveform>,
    /// LFO rate in Hz.
    pub lfo_speed: f32,
    /// LFO depth in percent of the base cutoff.
    pub lfo_depth: f32,
    /// Biquad response.
    pub filter_type: FilterType,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: DEFAULT_FILTER_FREQUENCY,
            q: DEFAULT_FILTER_Q,
            lfo: None,
            lfo_speed: DEFAULT_LFO_SPEED,
            lfo_depth: DEFAULT_LFO_DEPTH,
            filter_type: DEFAULT_FILTER_TYPE,
        }
    }
}

/// Biquad filter stage with a togglable cutoff LFO.
#[derive(Debug)]
pub struct FilterModule {
    filter: NodeId,
    lfo: NodeId,
    lfo_gain: NodeId,
    frequency: f32,
    q: f32,
    filter_type: FilterType,
    lfo_waveform: Waveform,
    lfo_speed: f32,
    lfo_depth: f32,
    lfo_enabled: bool,
    filter_enabled: bool,
}

impl FilterModule {
    pub(crate) fn new(graph: &mut AudioGraph) -> Result<Self> {
        let filter = create_filter_node(graph)?;
        let lfo = Self::spawn_lfo(graph, DEFAULT_LFO_WAVEFORM, DEFAULT_LFO_SPEED)?;
        let lfo_gain = create_gain_node(graph);

        let module = Self {
            filter,
            lfo,
            lfo_gain,
            frequency: DEFAULT_FILTER_FREQUENCY,
            q: DEFAULT_FILTER_Q,
            filter_type: DEFAULT_FILTER_TYPE,
            lfo_waveform: DEFAULT_LFO_WAVEFORM,
            lfo_speed: DEFAULT_LFO_SPEED,
            lfo_depth: DEFAULT_LFO_DEPTH,
            lfo_enabled: false,
            filter_enabled: false,
        };
        graph.set_param_immediate(lfo_gain, ParamKind::Gain, module.effective_depth())?;
        graph.connect_param(lfo_gain, filter, ParamKind::Frequency)?;
        debug!(filter = %filter, lfo = %lfo, "filter module created");
        Ok(module)
    }

    /// Creates and starts an LFO oscillator.
    fn spawn_lfo(graph: &mut AudioGraph, waveform: Waveform, speed: f32) -> Result<NodeId> {
        let lfo = create_oscillator(graph, waveform);
        graph.set_param_immediate(lfo, ParamKind::Frequency, speed)?;
        start_oscillation(graph, lfo)?;
        Ok(lfo)
    }

    /// The biquad node. It is both the module's input and its output.
    pub fn filter_node(&self) -> NodeId {
        self.filter
    }

    /// The current LFO oscillator. Changes when a spent LFO is replaced.
    pub fn lfo_node(&self) -> NodeId {
        self.lfo
    }

    /// The gain node scaling the LFO onto the cutoff.
    pub fn lfo_gain_node(&self) -> NodeId {
        self.lfo_gain
    }

    /// Whether the filter stage is in the route.
    pub fn is_enabled(&self) -> bool {
        self.filter_enabled
    }

    /// Whether the LFO is connected.
    pub fn is_lfo_enabled(&self) -> bool {
        self.lfo_enabled
    }

    /// Only the voice chain flips this, and it always reroutes afterwards.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.filter_enabled = enabled;
    }

    /// Connects or disconnects the LFO. Idempotent.
    ///
    /// A disabled LFO keeps running, so re-enabling reuses it. If it has
    /// been stopped, a replacement with the same waveform and rate is
    /// created and started first, and the spent one is removed from the
    /// graph.
    pub fn toggle_lfo(&mut self, graph: &mut AudioGraph, enabled: bool) -> Result<()> {
        if enabled == self.lfo_enabled {
            return Ok(());
        }
        if enabled {
            if graph.oscillator_state(self.lfo)? == OscillatorState::Stopped {
                self.replace_lfo(graph)?;
            }
            graph.connect(self.lfo, self.lfo_gain)?;
        } else {
            graph.disconnect(self.lfo)?;
        }
        self.lfo_enabled = enabled;
        debug!(enabled, lfo = %self.lfo, "filter lfo toggled");
        Ok(())
    }

    fn replace_lfo(&mut self, graph: &mut AudioGraph) -> Result<()> {
        let spent = self.lfo;
        self.lfo = Self::spawn_lfo(graph, self.lfo_waveform, self.lfo_speed)?;
        graph.remove_node(spent)?;
        debug!(spent = %spent, replacement = %self.lfo, "replaced stopped lfo");
        Ok(())
    }

    /// Stops the LFO for good. Returns whether it was running.
    ///
    /// The LFO stays connected if it was; its output is silent from now on.
    /// The next enable after a disable allocates a new one.
    pub fn stop_lfo(&mut self, graph: &mut AudioGraph) -> Result<bool> {
        stop_oscillation(graph, self.lfo)
    }

    /// Sets the base cutoff in Hz and rescales the LFO depth to match.
    pub fn set_frequency(&mut self, graph: &mut AudioGraph, frequency: f32) -> Result<()> {
        self.frequency = frequency;
        graph.set_param(self.filter, ParamKind::Frequency, frequency)?;
        self.update_depth(graph)
    }

    /// Sets the resonance.
    pub fn set_q(&mut self, graph: &mut AudioGraph, q: f32) -> Result<()> {
        self.q = q;
        graph.set_param(self.filter, ParamKind::Q, q)?;
        Ok(())
    }

    /// Sets the biquad response.
    pub fn set_filter_type(&mut self, graph: &mut AudioGraph, filter_type: FilterType) -> Result<()> {
        self.filter_type = filter_type;
        graph.set_filter_type(self.filter, filter_type)?;
        Ok(())
    }

    /// Sets the LFO rate in Hz.
    pub fn set_lfo_speed(&mut self, graph: &mut AudioGraph, speed: f32) -> Result<()> {
        self.lfo_speed = speed;
        graph.set_param(self.lfo, ParamKind::Frequency, speed)?;
        Ok(())
    }

    /// Sets the LFO depth in percent of the base cutoff.
    pub fn set_lfo_depth(&mut self, graph: &mut AudioGraph, depth: f32) -> Result<()> {
        self.lfo_depth = depth;
        self.update_depth(graph)
    }

    /// Changes the LFO waveform, live.
    pub fn set_lfo_waveform(&mut self, graph: &mut AudioGraph, waveform: Waveform) -> Result<()> {
        self.lfo_waveform = waveform;
        graph.set_waveform(self.lfo, waveform)?;
        Ok(())
    }

    fn update_depth(&mut self, graph: &mut AudioGraph) -> Result<()> {
        graph.set_param(self.lfo_gain, ParamKind::Gain, self.effective_depth())?;
        Ok(())
    }

    /// Applies every field of `settings` except `enabled`.
    ///
    /// `lfo: None` disables the LFO, any waveform enables it. The filter
    /// stage's own enable flag is left to the voice chain, which owns
    /// routing.
    pub fn apply_settings(&mut self, graph: &mut AudioGraph, settings: &FilterSettings) -> Result<()> {
        self.set_filter_type(graph, settings.filter_type)?;
        self.set_q(graph, settings.q)?;
        self.set_lfo_speed(graph, settings.lfo_speed)?;
        self.lfo_depth = settings.lfo_depth;
        self.set_frequency(graph, settings.frequency)?;
        match settings.lfo {
            Some(waveform) => {
                self.set_lfo_waveform(graph, waveform)?;
                self.toggle_lfo(graph, true)
            }
            None => self.toggle_lfo(graph, false),
        }
    }

    /// Snapshot of the module's configuration.
    pub fn settings(&self) -> FilterSettings {
        FilterSettings {
            enabled: self.filter_enabled,
            frequency: self.frequency,
            q: self.q,
            lfo: self.lfo_enabled.then_some(self.lfo_waveform),
            lfo_speed: self.lfo_speed,
            lfo_depth: self.lfo_depth,
            filter_type: self.filter_type,
        }
    }

    /// Base cutoff in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Resonance.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Biquad response.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// LFO rate in Hz.
    pub fn lfo_speed(&self) -> f32 {
        self.lfo_speed
    }

    /// LFO depth in percent of the base cutoff.
    pub fn lfo_depth(&self) -> f32 {
        self.lfo_depth
    }

    /// LFO waveform.
    pub fn lfo_waveform(&self) -> Waveform {
        self.lfo_waveform
    }

    /// Peak cutoff deviation in Hz: `depth% × base frequency`.
    pub fn effective_depth(&self) -> f32 {
        self.lfo_depth / 100.0 * self.frequency
    }

    /// Removes every node the module owns.
    pub(crate) fn destroy(self, graph: &mut AudioGraph) -> Result<()> {
        graph.remove_node(self.lfo)?;
        graph.remove_node(self.lfo_gain)?;
        graph.remove_node(self.filter)?;
        Ok(())
    }
}
