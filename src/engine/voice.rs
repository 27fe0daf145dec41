use crate::dsp::mix::accumulate;
use crate::effects::{EffectRegistry, NoteContext, Signal};
use crate::engine::{config::TransportConfig, scheduler::ScheduledNote};
use crate::graph::{
    envelope::EnvNode,
    extensions::NodeExt,
    node::{GraphNode, RenderCtx},
    oscillator::OscNode,
};
use crate::sequencing::note::Note;
use crate::MAX_BLOCK_SIZE;

/// Identifies a voice for its note-off.
pub type VoiceId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Built, waiting for note-on.
    Pending,
    /// Between note-on and note-off.
    Held,
    /// Note-off (or a fade) received, tail still ringing.
    Released,
}

/// One scheduled note with its own signal graph.
///
/// The graph is built when the note is scheduled: oscillator, then every
/// enabled effect in chain order, then the gain envelope. The envelope sits
/// last so a fade silences whatever the effects produce.
pub struct Voice {
    id: VoiceId,
    step: usize,
    note: Note,
    audition: bool,
    gate: Gate,
    graph: Box<dyn GraphNode>,
    ctx: RenderCtx,
    elapsed: u64,
}

impl Voice {
    pub fn build(
        id: VoiceId,
        scheduled: &ScheduledNote,
        config: &TransportConfig,
        effects: &mut EffectRegistry,
        sample_rate: f32,
    ) -> Self {
        let mut signal = Signal::new(OscNode::new(config.waveform).boxed());
        let note_ctx = NoteContext {
            note: scheduled.note,
            step: scheduled.step,
            frequency: scheduled.frequency,
            sample_rate,
        };
        effects.process(&mut signal, &note_ctx);

        let shape = config.envelope;
        let graph = signal
            .into_node()
            .amplify(EnvNode::new(shape.attack, shape.release))
            .boxed();

        Self {
            id,
            step: scheduled.step,
            note: scheduled.note,
            audition: false,
            gate: Gate::Pending,
            graph,
            ctx: RenderCtx::from_freq(sample_rate, scheduled.frequency as f32, config.volume()),
            elapsed: 0,
        }
    }

    /// Mark as a one-off preview rather than part of a playback run.
    pub fn into_audition(mut self) -> Self {
        self.audition = true;
        self
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn is_audition(&self) -> bool {
        self.audition
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }

    fn now(&self) -> RenderCtx {
        self.ctx.advanced(self.elapsed as usize)
    }

    pub fn start(&mut self) {
        if self.gate == Gate::Pending {
            self.gate = Gate::Held;
            self.elapsed = 0;
            let ctx = self.now();
            self.graph.note_on(&ctx);
        }
    }

    pub fn release(&mut self) {
        if self.gate == Gate::Held {
            self.gate = Gate::Released;
            let ctx = self.now();
            self.graph.note_off(&ctx);
        }
    }

    /// Force silence within `seconds`, whatever the gate.
    pub fn fade(&mut self, seconds: f32) {
        if self.gate == Gate::Pending {
            return;
        }
        self.gate = Gate::Released;
        let ctx = self.now();
        self.graph.fade_out(seconds, &ctx);
    }

    /// Render and add into `bus`, scaled by the note's volume.
    pub fn render_into(&mut self, bus: &mut [f32], scratch: &mut [f32]) {
        for chunk in bus.chunks_mut(MAX_BLOCK_SIZE) {
            let frames = &mut scratch[..chunk.len()];
            let ctx = self.now();
            self.graph.render_block(frames, &ctx);
            accumulate(chunk, frames, ctx.velocity);
            self.elapsed += chunk.len() as u64;
        }
    }

    /// Released and fully decayed.
    pub fn is_finished(&self) -> bool {
        self.gate == Gate::Released && !self.graph.is_active()
    }
}
