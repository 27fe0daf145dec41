/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz)
/// - velocity: Gain applied to the note, 0.0-1.0
/// - time: Seconds since the note started
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
    pub time: f64,
}

impl RenderCtx {
    /// Context for a note at `frequency`, at its very start.
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
            time: 0.0,
        }
    }

    /// Same note, `frames` samples later.
    pub fn advanced(&self, frames: usize) -> Self {
        Self {
            time: self.time + frames as f64 / self.sample_rate as f64,
            ..*self
        }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes render audio block by block and respond to the note lifecycle:
/// note on, note off, and a forced fade when playback is cancelled.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a note starts
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Triggered when a note is released
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    /// Bring the output to silence within `seconds`, from any state.
    fn fade_out(&mut self, _seconds: f32, _ctx: &RenderCtx) {}

    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing sound
    ///
    /// Used by the transport to know when a voice can be dropped.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn fade_out(&mut self, seconds: f32, ctx: &RenderCtx) {
        (**self).fade_out(seconds, ctx)
    }

    fn get_envelope_level(&self) -> Option<f32> {
        (**self).get_envelope_level()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Outputs zeros. Stands in while a signal is being rewired.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silence;

impl GraphNode for Silence {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        out.fill(0.0);
    }

    fn is_active(&self) -> bool {
        false
    }
}
