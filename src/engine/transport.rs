use std::collections::VecDeque;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::mix::soft_limit;
use crate::effects::EffectRegistry;
use crate::engine::{
    config::TransportConfig,
    scheduler::{to_frames, Schedule},
    voice::{Gate, Voice, VoiceId},
};
use crate::error::{ResourceError, StateError};
use crate::sequencing::note::{Note, Step};
use crate::MAX_BLOCK_SIZE;

/*
Transport
=========

The transport owns the one output timeline. It is driven entirely by the
audio sink pulling blocks through `render_block`; there are no timers and no
threads inside it.

Timeline
--------

`play` computes the whole run up front, relative to a single origin t0 (the
transport clock at the moment of the call):

    frame(step i)        = t0 + round(i * seconds_per_step * sr)
    frame(note on)       = t0 + round((step start + k * strum_delay) * sr)
    frame(note off)      = t0 + round((note on + duration) * sr)
    frame(end of run)    = t0 + round(length * sr)

Frame arithmetic saturates, so a tempo slow enough to push events past the
end of the clock parks them there instead of wrapping.

Every note's voice is built at that point, effects included, and parked
inside its note-on event. The events sit in one queue ordered by frame.

Rendering
---------

`render_block` walks the block, splitting it at each due event so note-ons
and note-offs land on their exact frame:

    block:   |---- render ----|E|--- render ---|E E|-- render --|
                              ↑                 ↑
                       note-on fires      off + step start

Events sharing a frame fire note-offs first, then step starts, then
note-ons, so a repeated note on the same string is released before it is
struck again. The end-of-run marker fires last; a trailing rest keeps the
run going until its step has run out.

States
------

    Idle ──play──→ Scheduled ──first event──→ Playing ──end + last tail──→ Idle
                      │                          │
                      └──────────stop────────────┴──→ Cancelled ──fade done──→ Idle

`stop` drops every pending event (and with them every voice not yet
started) and fades the sounding voices over STOP_FADE. Nothing is pending
once `stop` returns and nothing is audible once the fade has rendered.
*/

/// Fade applied to sounding notes by [`Transport::stop`], in seconds.
pub const STOP_FADE: f32 = 0.005;

/// Knee of the output limiter.
const LIMIT_KNEE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    /// A run is laid out but nothing has fired yet.
    Scheduled,
    Playing,
    /// Stopped; sounding notes are fading out.
    Cancelled,
}

/// Notification pushed to the subscriber as the timeline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    StepStarted { step: usize },
    NoteSounding { step: usize, string: u8, fret: u8 },
    NoteSilenced { step: usize, string: u8, fret: u8 },
    /// The run played to the end and every note has decayed.
    Finished,
    /// The run was stopped.
    Cancelled,
}

enum EventKind {
    NoteOff(VoiceId),
    StepStart(usize),
    NoteOn(Box<Voice>),
    End,
}

impl EventKind {
    fn rank(&self) -> u8 {
        match self {
            EventKind::NoteOff(_) => 0,
            EventKind::StepStart(_) => 1,
            EventKind::NoteOn(_) => 2,
            EventKind::End => 3,
        }
    }
}

struct Event {
    frame: u64,
    timeline: bool,
    kind: EventKind,
}

impl Event {
    fn key(&self) -> (u64, u8) {
        (self.frame, self.kind.rank())
    }
}

/// Drift-free, cancellable playback of a step sequence.
pub struct Transport {
    sample_rate: f32,
    clock: u64,
    state: TransportState,
    events: VecDeque<Event>,
    active: Vec<Voice>,
    scratch: Vec<f32>,
    next_voice: VoiceId,
    origin: u64,
    schedule: Option<Schedule>,
    current_step: Option<usize>,
    notify: Option<Producer<PlaybackEvent>>,
    closed: bool,
}

impl Transport {
    pub fn new(sample_rate: f32) -> Result<Self, ResourceError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ResourceError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            clock: 0,
            state: TransportState::Idle,
            events: VecDeque::new(),
            active: Vec::new(),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            next_voice: 0,
            origin: 0,
            schedule: None,
            current_step: None,
            notify: None,
            closed: false,
        })
    }

    /// Open a notification channel. Replaces any earlier subscriber.
    ///
    /// Events are dropped when the buffer is full; the audio side never
    /// waits on the reader.
    pub fn subscribe(&mut self, capacity: usize) -> Consumer<PlaybackEvent> {
        let (tx, rx) = RingBuffer::new(capacity.max(1));
        self.notify = Some(tx);
        rx
    }

    fn emit(&mut self, event: PlaybackEvent) {
        if let Some(tx) = self.notify.as_mut() {
            let _ = tx.push(event);
        }
    }

    fn voice_id(&mut self) -> VoiceId {
        self.next_voice += 1;
        self.next_voice
    }

    /// Lay out `steps` from the current clock and start playing.
    ///
    /// `config` and the effect chain are read once, here. Voices still
    /// fading from an earlier `stop` finish their fade.
    pub fn play(
        &mut self,
        steps: &[Step],
        config: &TransportConfig,
        effects: &mut EffectRegistry,
    ) -> crate::Result<()> {
        if self.closed {
            return Err(ResourceError::SinkClosed.into());
        }
        if matches!(self.state, TransportState::Scheduled | TransportState::Playing) {
            return Err(StateError::AlreadyPlaying.into());
        }

        let schedule = Schedule::build(steps, config)?;
        let t0 = self.clock;
        let sr = self.sample_rate;

        let mut events = Vec::with_capacity(schedule.step_starts.len() + 2 * schedule.notes.len() + 1);
        for (step, &start) in schedule.step_starts.iter().enumerate() {
            events.push(Event {
                frame: t0.saturating_add(to_frames(start, sr)),
                timeline: true,
                kind: EventKind::StepStart(step),
            });
        }
        for scheduled in &schedule.notes {
            let id = self.voice_id();
            let on = t0.saturating_add(to_frames(scheduled.on, sr));
            let off = t0
                .saturating_add(to_frames(scheduled.off, sr))
                .max(on.saturating_add(1));
            let voice = Voice::build(id, scheduled, config, effects, sr);
            events.push(Event {
                frame: on,
                timeline: true,
                kind: EventKind::NoteOn(Box::new(voice)),
            });
            events.push(Event {
                frame: off,
                timeline: true,
                kind: EventKind::NoteOff(id),
            });
        }
        events.push(Event {
            frame: t0.saturating_add(to_frames(schedule.length, sr)),
            timeline: true,
            kind: EventKind::End,
        });
        // Stable: strum order survives among note-ons sharing a frame
        events.sort_by_key(Event::key);

        log::info!(
            "play: {} steps, {} notes at {} bpm",
            steps.len(),
            schedule.notes.len(),
            config.tempo_bpm()
        );

        self.events.retain(|e| !e.timeline);
        for event in events {
            self.insert(event);
        }
        self.origin = t0;
        self.schedule = Some(schedule);
        self.current_step = None;
        self.state = TransportState::Scheduled;
        Ok(())
    }

    /// Sound one note now, outside any run. Stopping also silences it.
    pub fn audition(
        &mut self,
        note: &Note,
        config: &TransportConfig,
        effects: &mut EffectRegistry,
    ) -> crate::Result<()> {
        self.audition_schedule(&Schedule::single(note, config), config, effects)
    }

    /// Strum one step now, outside any run.
    pub fn audition_step(
        &mut self,
        step: &Step,
        config: &TransportConfig,
        effects: &mut EffectRegistry,
    ) -> crate::Result<()> {
        let schedule = Schedule::build(std::slice::from_ref(step), config)?;
        self.audition_schedule(&schedule, config, effects)
    }

    fn audition_schedule(
        &mut self,
        schedule: &Schedule,
        config: &TransportConfig,
        effects: &mut EffectRegistry,
    ) -> crate::Result<()> {
        if self.closed {
            return Err(ResourceError::SinkClosed.into());
        }
        let sr = self.sample_rate;
        for scheduled in &schedule.notes {
            let id = self.voice_id();
            let on = self.clock.saturating_add(to_frames(scheduled.on, sr));
            let off = self
                .clock
                .saturating_add(to_frames(scheduled.off, sr))
                .max(on.saturating_add(1));
            let voice = Voice::build(id, scheduled, config, effects, sr).into_audition();
            self.insert(Event {
                frame: on,
                timeline: false,
                kind: EventKind::NoteOn(Box::new(voice)),
            });
            self.insert(Event {
                frame: off,
                timeline: false,
                kind: EventKind::NoteOff(id),
            });
        }
        Ok(())
    }

    fn insert(&mut self, event: Event) {
        let key = event.key();
        let at = self.events.partition_point(|e| e.key() <= key);
        self.events.insert(at, event);
    }

    /// Cancel the run: drop everything pending, fade everything sounding.
    pub fn stop(&mut self) {
        let dropped = self.events.len();
        self.events.clear();

        let mut silenced = Vec::new();
        for voice in self.active.iter_mut() {
            if voice.gate() == Gate::Held && !voice.is_audition() {
                silenced.push(PlaybackEvent::NoteSilenced {
                    step: voice.step(),
                    string: voice.note().string(),
                    fret: voice.note().fret(),
                });
            }
            voice.fade(STOP_FADE);
        }

        let was_running = matches!(
            self.state,
            TransportState::Scheduled | TransportState::Playing
        );
        if was_running {
            for event in silenced {
                self.emit(event);
            }
            self.emit(PlaybackEvent::Cancelled);
            log::info!("stop: dropped {dropped} pending events");
        }

        self.current_step = None;
        self.state = if self.active.iter().any(|v| !v.is_finished()) {
            TransportState::Cancelled
        } else {
            TransportState::Idle
        };
    }

    /// Mark the sink as gone. Stops playback; later `play` calls fail.
    pub fn close(&mut self) {
        self.stop();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Pull the next block of output. `out` is overwritten.
    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let len = out.len();
        let mut pos = 0;

        loop {
            let now = self.clock + pos as u64;
            while self.events.front().is_some_and(|e| e.frame <= now) {
                if let Some(event) = self.events.pop_front() {
                    self.fire(event);
                }
            }

            let next = self
                .events
                .front()
                .map(|e| ((e.frame - self.clock) as usize).min(len))
                .unwrap_or(len);

            if next > pos {
                let segment = &mut out[pos..next];
                for voice in self.active.iter_mut() {
                    voice.render_into(segment, &mut self.scratch);
                }
            }
            pos = next;
            if pos >= len {
                break;
            }
        }

        self.clock += len as u64;
        self.active.retain(|v| !v.is_finished());
        soft_limit(out, LIMIT_KNEE);
        self.settle();
    }

    fn fire(&mut self, event: Event) {
        if event.timeline && self.state == TransportState::Scheduled {
            self.state = TransportState::Playing;
        }
        match event.kind {
            EventKind::StepStart(step) => {
                self.current_step = Some(step);
                self.emit(PlaybackEvent::StepStarted { step });
            }
            EventKind::NoteOn(mut voice) => {
                log::trace!("note on {:?} step {}", voice.note().key(), voice.step());
                voice.start();
                if !voice.is_audition() {
                    self.emit(PlaybackEvent::NoteSounding {
                        step: voice.step(),
                        string: voice.note().string(),
                        fret: voice.note().fret(),
                    });
                }
                self.active.push(*voice);
            }
            EventKind::NoteOff(id) => {
                let mut silenced = None;
                if let Some(voice) = self.active.iter_mut().find(|v| v.id() == id) {
                    log::trace!("note off {:?} step {}", voice.note().key(), voice.step());
                    voice.release();
                    if !voice.is_audition() {
                        silenced = Some(PlaybackEvent::NoteSilenced {
                            step: voice.step(),
                            string: voice.note().string(),
                            fret: voice.note().fret(),
                        });
                    }
                }
                if let Some(event) = silenced {
                    self.emit(event);
                }
            }
            EventKind::End => log::debug!("end of run at frame {}", event.frame),
        }
    }

    fn settle(&mut self) {
        let timeline_pending = self.events.iter().any(|e| e.timeline);
        let timeline_sounding = self.active.iter().any(|v| !v.is_audition());
        match self.state {
            TransportState::Playing if !timeline_pending && !timeline_sounding => {
                log::info!("playback finished");
                self.current_step = None;
                self.state = TransportState::Idle;
                self.emit(PlaybackEvent::Finished);
            }
            TransportState::Cancelled if !timeline_sounding => {
                self.state = TransportState::Idle;
            }
            _ => {}
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, TransportState::Scheduled | TransportState::Playing)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered since construction.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Events not yet fired.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Notes between note-on and note-off. Fading and releasing notes are
    /// not counted.
    pub fn sounding_notes(&self) -> usize {
        self.active.iter().filter(|v| v.gate() == Gate::Held).count()
    }

    /// Voices still producing any output, tails included.
    pub fn audible_voices(&self) -> usize {
        self.active.len()
    }

    /// Step most recently started in the current run.
    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    /// Schedule of the current (or last) run.
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// Seconds since the current run's origin.
    pub fn position(&self) -> f64 {
        self.clock.saturating_sub(self.origin) as f64 / self.sample_rate as f64
    }

    /// Step start frames of the current run, relative to its origin.
    pub fn step_offsets(&self) -> Vec<u64> {
        self.schedule
            .as_ref()
            .map(|s| {
                s.step_starts
                    .iter()
                    .map(|&t| to_frames(t, self.sample_rate))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("sample_rate", &self.sample_rate)
            .field("clock", &self.clock)
            .field("state", &self.state)
            .field("pending", &self.events.len())
            .field("active", &self.active.len())
            .finish()
    }
}
