use std::collections::HashMap;

use crate::dsp::lfo::{bend_offset, semitones_to_ratio, vibrato_offset};
use crate::effects::unit::{flag, number_in, EffectUnit, NoteContext, Param, Settings, Signal};
use crate::error::PluginError;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::sequencing::note::Note;

const NAME: &str = "bend";

/// Setting keys.
pub const SEMITONES: &str = "semitoneBend";
pub const DELAY: &str = "delay";
pub const BEND_TIME: &str = "bendTime";
pub const VIBRATO: &str = "vibrato";
pub const VIBRATO_SPEED: &str = "vibratoSpeed";
pub const VIBRATO_DEPTH: &str = "vibratoDepth";

/// Samples between pitch updates.
const CONTROL_BLOCK: usize = 32;

/// Resolved bend parameters for one note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendParams {
    /// Target bend, semitones (negative bends down).
    pub semitones: f32,
    /// Time before the bend starts, ms.
    pub delay_ms: f32,
    /// Time to reach the target, ms. Zero jumps.
    pub bend_time_ms: f32,
    pub vibrato: bool,
    /// Vibrato rate, Hz.
    pub vibrato_speed: f32,
    /// Vibrato swing either side, semitones.
    pub vibrato_depth: f32,
}

impl Default for BendParams {
    fn default() -> Self {
        Self {
            semitones: 1.0,
            delay_ms: 0.0,
            bend_time_ms: 0.0,
            vibrato: false,
            vibrato_speed: 5.0,
            vibrato_depth: 0.5,
        }
    }
}

impl BendParams {
    /// `self` with every key present in `settings` overridden.
    pub fn merged(&self, settings: &Settings) -> Result<Self, PluginError> {
        let number = |key: &str, range: std::ops::RangeInclusive<f64>| {
            number_in(NAME, settings, key, range).map(|v| v.map(|v| v as f32))
        };
        Ok(Self {
            semitones: number(SEMITONES, -12.0..=12.0)?.unwrap_or(self.semitones),
            delay_ms: number(DELAY, 0.0..=10_000.0)?.unwrap_or(self.delay_ms),
            bend_time_ms: number(BEND_TIME, 0.0..=10_000.0)?.unwrap_or(self.bend_time_ms),
            vibrato: flag(NAME, settings, VIBRATO)?.unwrap_or(self.vibrato),
            vibrato_speed: number(VIBRATO_SPEED, 0.0..=20.0)?.unwrap_or(self.vibrato_speed),
            vibrato_depth: number(VIBRATO_DEPTH, 0.0..=2.0)?.unwrap_or(self.vibrato_depth),
        })
    }

    pub fn to_settings(&self) -> Settings {
        [
            (SEMITONES, Param::Number(self.semitones as f64)),
            (DELAY, Param::Number(self.delay_ms as f64)),
            (BEND_TIME, Param::Number(self.bend_time_ms as f64)),
            (VIBRATO, Param::Flag(self.vibrato)),
            (VIBRATO_SPEED, Param::Number(self.vibrato_speed as f64)),
            (VIBRATO_DEPTH, Param::Number(self.vibrato_depth as f64)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// True when the parameters leave the pitch untouched.
    pub fn is_flat(&self) -> bool {
        self.semitones == 0.0 && !(self.vibrato && self.vibrato_depth > 0.0)
    }

    /// Pitch offset in semitones, `elapsed` seconds into the note.
    pub fn offset_at(&self, elapsed: f32) -> f32 {
        let delay = self.delay_ms / 1_000.0;
        let mut semis = bend_offset(elapsed, delay, self.bend_time_ms / 1_000.0, self.semitones);
        if self.vibrato && elapsed >= delay {
            semis += vibrato_offset(elapsed - delay, self.vibrato_speed, self.vibrato_depth);
        }
        semis
    }
}

/// Pitch bend with optional vibrato.
///
/// Bends every note by `semitoneBend` once `delay` ms have passed. Single
/// note positions can carry their own overrides, e.g. a full-tone bend on
/// the 7th fret of the G string only.
#[derive(Debug, Clone)]
pub struct Bend {
    params: BendParams,
    overrides: HashMap<(u8, u8), Settings>,
    enabled: bool,
}

impl Default for Bend {
    fn default() -> Self {
        Self {
            params: BendParams::default(),
            overrides: HashMap::new(),
            enabled: true,
        }
    }
}

impl Bend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: BendParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> BendParams {
        self.params
    }

    /// Parameters that will shape `note`.
    pub fn params_for(&self, note: &Note) -> Result<BendParams, PluginError> {
        match self.overrides.get(&note.key()) {
            Some(over) => self.params.merged(over),
            None => Ok(self.params),
        }
    }
}

impl EffectUnit for Bend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, signal: &mut Signal, ctx: &NoteContext) -> Result<(), PluginError> {
        let params = self.params_for(&ctx.note)?;
        if params.is_flat() {
            return Ok(());
        }
        signal.wrap(|inner| PitchBend::new(inner, params));
        Ok(())
    }

    fn settings(&self) -> Settings {
        self.params.to_settings()
    }

    fn validate_settings(&self, settings: &Settings) -> Result<(), PluginError> {
        self.params.merged(settings).map(|_| ())
    }

    fn apply_settings(&mut self, settings: &Settings) -> Result<(), PluginError> {
        self.params = self.params.merged(settings)?;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn note_settings(&self, note: &Note) -> Option<Settings> {
        self.overrides.get(&note.key()).cloned()
    }

    fn apply_note_settings(&mut self, note: &Note, settings: &Settings) -> Result<(), PluginError> {
        self.params.merged(settings)?;
        self.overrides.insert(note.key(), settings.clone());
        Ok(())
    }

    fn clear_note_settings(&mut self, note: &Note) {
        self.overrides.remove(&note.key());
    }
}

/// Renders its source at a pitch that moves over time.
///
/// The block is split into short control blocks; each is rendered with the
/// context frequency scaled by the bend ratio at that moment.
pub struct PitchBend<N> {
    inner: N,
    params: BendParams,
}

impl<N> PitchBend<N> {
    pub fn new(inner: N, params: BendParams) -> Self {
        Self { inner, params }
    }
}

impl<N: GraphNode> GraphNode for PitchBend<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let mut offset = 0;
        for chunk in out.chunks_mut(CONTROL_BLOCK) {
            let chunk_ctx = ctx.advanced(offset);
            let ratio = semitones_to_ratio(self.params.offset_at(chunk_ctx.time as f32));
            let bent = RenderCtx {
                frequency: ctx.frequency * ratio,
                ..chunk_ctx
            };
            self.inner.render_block(chunk, &bent);
            offset += chunk.len();
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.inner.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.inner.note_off(ctx);
    }

    fn fade_out(&mut self, seconds: f32, ctx: &RenderCtx) {
        self.inner.fade_out(seconds, ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.inner.get_envelope_level()
    }

    fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}
