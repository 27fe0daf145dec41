use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a modulator, sample by sample.
///
/// Used to apply the gate envelope to a note. Blocks longer than
/// [`MAX_BLOCK_SIZE`] are processed in chunks so the scratch buffer never
/// grows on the audio thread.
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let mut offset = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let chunk_ctx = ctx.advanced(offset);
            self.signal.render_block(chunk, &chunk_ctx);

            let frames = &mut self.temp_buffer[..chunk.len()];
            frames.fill(0.0);
            self.modulator.render_block(frames, &chunk_ctx);

            for (o, m) in chunk.iter_mut().zip(frames.iter()) {
                *o *= *m;
            }
            offset += chunk.len();
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    fn fade_out(&mut self, seconds: f32, ctx: &RenderCtx) {
        self.signal.fade_out(seconds, ctx);
        self.modulator.fade_out(seconds, ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.modulator
            .get_envelope_level()
            .or_else(|| self.signal.get_envelope_level())
    }

    /// Silent as soon as either factor is.
    fn is_active(&self) -> bool {
        self.modulator.is_active() && self.signal.is_active()
    }
}
