use crate::{
    dsp::envelope::Envelope,
    graph::node::{GraphNode, RenderCtx},
};

/// Gate envelope as a graph node. Renders its level, so it is normally the
/// modulator side of an [`Amplify`](crate::graph::amplify::Amplify).
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    /// Attack and release in seconds.
    pub fn new(attack: f32, release: f32) -> Self {
        Self {
            env: Envelope::new(attack, release),
        }
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.env.note_on();
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.env.note_off(ctx);
    }

    fn fade_out(&mut self, seconds: f32, ctx: &RenderCtx) {
        self.env.fade_out(seconds, ctx.sample_rate);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.env.level())
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}
