use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::graph::node::{GraphNode, RenderCtx};

/// Pitched sound source. Tracks `ctx.frequency`, so anything upstream that
/// rewrites the context frequency (a bend) retunes it between blocks.
pub struct OscNode {
    osc: OscillatorBlock,
}

impl OscNode {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_tracks_context_frequency() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_freq(sample_rate, 329.63, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.note_on(&ctx);
        osc.render_block(&mut buffer, &ctx);

        let n = 40;
        let expected = (TAU * ctx.frequency * n as f32 / sample_rate).sin();
        assert!((buffer[n] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_note_on_restarts_phase() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);
        let mut osc = OscNode::triangle();
        let mut first = vec![0.0; 33];
        osc.render_block(&mut first, &ctx);

        osc.note_on(&ctx);
        let mut second = vec![0.0; 33];
        osc.render_block(&mut second, &ctx);
        assert_eq!(first[0], second[0]);
        assert_eq!(osc.waveform(), Waveform::Triangle);
    }
}
