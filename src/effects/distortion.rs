use crate::dsp::{
    distortion::{ShaperMode, MAX_AMOUNT},
    mix::apply_dry_wet,
};
use crate::effects::unit::{number_in, settings, EffectUnit, NoteContext, Param, Settings, Signal};
use crate::error::PluginError;
use crate::graph::{
    extensions::NodeExt,
    node::{GraphNode, RenderCtx},
};
use crate::MAX_BLOCK_SIZE;

const NAME: &str = "distortion";

/// Setting keys.
pub const AMOUNT: &str = "distortionAmount";
pub const MODE: &str = "mode";
pub const MIX: &str = "mix";

/// Waveshaping distortion.
///
/// `distortionAmount` runs 0..100 (0 leaves the classic curve at a third of
/// full scale, no harmonics). `mode` picks the transfer function, `mix`
/// blends the shaped signal with the clean one.
#[derive(Debug, Clone)]
pub struct Distortion {
    amount: f32,
    mode: ShaperMode,
    mix: f32,
    enabled: bool,
}

impl Default for Distortion {
    fn default() -> Self {
        Self {
            amount: 0.0,
            mode: ShaperMode::Curve,
            mix: 1.0,
            enabled: true,
        }
    }
}

impl Distortion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = amount.clamp(0.0, MAX_AMOUNT);
        self
    }

    pub fn with_mode(mut self, mode: ShaperMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_mix(mut self, mix: f32) -> Self {
        self.mix = mix.clamp(0.0, 1.0);
        self
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn mode(&self) -> ShaperMode {
        self.mode
    }

    fn parse_mode(settings: &Settings) -> Result<Option<ShaperMode>, PluginError> {
        let Some(param) = settings.get(MODE) else {
            return Ok(None);
        };
        param
            .as_text()
            .and_then(ShaperMode::from_name)
            .map(Some)
            .ok_or_else(|| PluginError::InvalidSetting {
                name: NAME.to_string(),
                key: MODE.to_string(),
                reason: "expected one of curve, soft, hard, foldback".to_string(),
            })
    }
}

impl EffectUnit for Distortion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, signal: &mut Signal, _ctx: &NoteContext) -> Result<(), PluginError> {
        let shaper = ShaperNode::new(self.mode, self.amount, self.mix);
        signal.wrap(|inner| inner.through(shaper));
        Ok(())
    }

    fn settings(&self) -> Settings {
        let mut s = settings([(AMOUNT, self.amount as f64), (MIX, self.mix as f64)]);
        s.insert(MODE.to_string(), Param::from(self.mode.name()));
        s
    }

    fn validate_settings(&self, settings: &Settings) -> Result<(), PluginError> {
        number_in(NAME, settings, AMOUNT, 0.0..=MAX_AMOUNT as f64)?;
        number_in(NAME, settings, MIX, 0.0..=1.0)?;
        Self::parse_mode(settings)?;
        Ok(())
    }

    fn apply_settings(&mut self, settings: &Settings) -> Result<(), PluginError> {
        let amount = number_in(NAME, settings, AMOUNT, 0.0..=MAX_AMOUNT as f64)?;
        let mix = number_in(NAME, settings, MIX, 0.0..=1.0)?;
        let mode = Self::parse_mode(settings)?;

        if let Some(amount) = amount {
            self.amount = amount as f32;
        }
        if let Some(mix) = mix {
            self.mix = mix as f32;
        }
        if let Some(mode) = mode {
            self.mode = mode;
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// In-place waveshaper with dry/wet blend. Parameters are fixed at build
/// time, so a note keeps the sound it was scheduled with.
pub struct ShaperNode {
    mode: ShaperMode,
    amount: f32,
    mix: f32,
    dry: Vec<f32>,
}

impl ShaperNode {
    pub fn new(mode: ShaperMode, amount: f32, mix: f32) -> Self {
        Self {
            mode,
            amount,
            mix: mix.clamp(0.0, 1.0),
            dry: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let dry = &mut self.dry[..chunk.len()];
            dry.copy_from_slice(chunk);
            for sample in chunk.iter_mut() {
                *sample = self.mode.apply(*sample, self.amount);
            }
            apply_dry_wet(dry, chunk, self.mix);
        }
    }

    fn is_active(&self) -> bool {
        false
    }
}
