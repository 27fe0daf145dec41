use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series: the source renders into the buffer,
then the processor rewrites that buffer in place.

  Source renders:     [0.5, 0.8, -0.3, 0.9, ...]
  Shaper in place:    [0.3, 0.4, -0.2, 0.4, ...]

Effects that only reshape samples (the waveshaper, a dry/wet blend) are
processors hung off a Through. Effects that need to change what the source
renders, such as a pitch bend, wrap the source instead of following it.

Every note event and fade is forwarded to both halves, source first, so a
processor sees the same lifecycle as the oscillator feeding it.

Signal Flow:
------------
  Through: [Source] ──→ [Processor] ──→ output

  Amplify: [Signal] ──┬──→ (×) ──→ output
           [Gain]   ──┘
*/

pub struct Through<S, F> {
    source: S,
    processor: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, processor: F) -> Self {
        Self { source, processor }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.processor.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.processor.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source.note_off(ctx);
        self.processor.note_off(ctx);
    }

    fn fade_out(&mut self, seconds: f32, ctx: &RenderCtx) {
        self.source.fade_out(seconds, ctx);
        self.processor.fade_out(seconds, ctx);
    }

    fn is_active(&self) -> bool {
        self.source.is_active() || self.processor.is_active()
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.source
            .get_envelope_level()
            .or_else(|| self.processor.get_envelope_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0, 1.0)
    }

    #[test]
    fn test_renders_source_then_processor() {
        let mut node = OscNode::sine().through(EnvNode::new(0.01, 0.05));
        let mut buffer = vec![1.0; 128];
        node.note_on(&ctx());
        node.render_block(&mut buffer, &ctx());

        // Envelope overwrites the oscillator output with its own level
        assert!(buffer.iter().all(|&s| (0.0..=1.0).contains(&s)));
        assert!(buffer[127] > buffer[0]);
    }

    #[test]
    fn test_forwards_note_events() {
        let mut node = OscNode::sine().through(EnvNode::new(0.01, 0.05));
        node.note_on(&ctx());
        node.note_off(&ctx());
        assert!(node.is_active(), "should stay active while the envelope releases");
    }

    #[test]
    fn test_reports_envelope_level_from_either_side() {
        let node = OscNode::sine().through(EnvNode::new(0.01, 0.05));
        assert_eq!(node.get_envelope_level(), Some(0.0));
    }
}
