//! The editing and playback session.
//!
//! A [`Session`] holds everything one document needs: the recorded steps,
//! the transport settings, the effect chain, the transport that renders it
//! and the notes currently selected on the fretboard. Front-ends call its
//! methods and read back [`SessionEvent`]s; nothing here is global, so any
//! number of sessions can live side by side.

use std::collections::VecDeque;

use rtrb::Consumer;

use crate::effects::{default_chain, EffectRegistry};
use crate::engine::{PlaybackEvent, Transport, TransportConfig, TransportState};
use crate::error::ResourceError;
use crate::sequencing::{
    duration::NoteDuration,
    note::{Note, Step, StrumDirection},
    sequence::SequenceStore,
    time_signature::TimeSignature,
};
use crate::tuning::{self, Interval};

/// Something the front-end should reflect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The current step moved (record, navigation, import).
    StepChanged(Option<usize>),
    /// Notes were added to or removed from the selection.
    SelectionChanged,
    /// A user action was refused; the text is ready to show.
    Rejected(String),
}

pub struct Session {
    store: SequenceStore,
    config: TransportConfig,
    effects: EffectRegistry,
    transport: Transport,
    selection: Vec<Note>,
    duration: NoteDuration,
    rest_mode: bool,
    strum: StrumDirection,
    events: VecDeque<SessionEvent>,
}

impl Session {
    /// Empty session with the built-in effect chain, rendering at
    /// `sample_rate`.
    pub fn new(sample_rate: f32) -> Result<Self, ResourceError> {
        Ok(Self {
            store: SequenceStore::new(),
            config: TransportConfig::default(),
            effects: default_chain(),
            transport: Transport::new(sample_rate)?,
            selection: Vec::new(),
            duration: NoteDuration::default(),
            rest_mode: false,
            strum: StrumDirection::default(),
            events: VecDeque::new(),
        })
    }

    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = effects;
        self
    }

    /// Back to a fresh document: playback stopped, no steps, no selection,
    /// default settings and effect chain. The audio sink is kept.
    pub fn reset(&mut self) {
        self.transport.stop();
        self.store.clear();
        self.selection.clear();
        self.config = TransportConfig::default();
        self.effects = default_chain();
        self.duration = NoteDuration::default();
        self.rest_mode = false;
        self.strum = StrumDirection::default();
        self.events.clear();
        self.events.push_back(SessionEvent::StepChanged(None));
        self.events.push_back(SessionEvent::SelectionChanged);
    }

    pub(crate) fn reject<T, E>(&mut self, result: Result<T, E>) -> crate::Result<T>
    where
        E: Into<crate::Error>,
    {
        result.map_err(|err| {
            let err = err.into();
            self.events.push_back(SessionEvent::Rejected(err.to_string()));
            err
        })
    }

    // Selection

    /// Select the note at (string, fret), or deselect it if it is already
    /// selected. Newly selected sounding notes are auditioned.
    ///
    /// Returns whether the note is selected afterwards.
    pub fn toggle_note_selection(
        &mut self,
        string: usize,
        fret: usize,
        duration: NoteDuration,
        is_rest: bool,
    ) -> crate::Result<bool> {
        let note = Note::new(string, fret, duration, is_rest);
        let note = self.reject(note)?;

        let selected = match self.selection.iter().position(|n| *n == note) {
            Some(index) => {
                self.selection.remove(index);
                false
            }
            None => {
                self.selection.push(note);
                if !note.is_rest {
                    self.audition(&note);
                }
                true
            }
        };
        self.events.push_back(SessionEvent::SelectionChanged);
        Ok(selected)
    }

    /// [`toggle_note_selection`](Self::toggle_note_selection) with the
    /// current duration and rest mode.
    pub fn toggle_note(&mut self, string: usize, fret: usize) -> crate::Result<bool> {
        self.toggle_note_selection(string, fret, self.duration, self.rest_mode)
    }

    /// Sound one note now, through the current effect chain.
    pub fn audition(&mut self, note: &Note) {
        if let Err(err) = self.transport.audition(note, &self.config, &mut self.effects) {
            log::warn!("audition of {:?} failed: {err}", note.key());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.events.push_back(SessionEvent::SelectionChanged);
    }

    /// Selected notes, in selection order.
    pub fn selection(&self) -> &[Note] {
        &self.selection
    }

    /// Interval of every selected note above the first one selected.
    pub fn selection_intervals(&self) -> Vec<(Note, Interval)> {
        let Some(base) = self.selection.first() else {
            return Vec::new();
        };
        self.selection
            .iter()
            .map(|n| (*n, tuning::interval_of(n, base)))
            .collect()
    }

    /// Duration used for newly selected notes; leaves rest mode.
    pub fn set_note_duration(&mut self, duration: NoteDuration) {
        self.duration = duration;
        self.rest_mode = false;
    }

    /// Duration used for newly selected rests; enters rest mode.
    pub fn set_rest_duration(&mut self, duration: NoteDuration) {
        self.duration = duration;
        self.rest_mode = true;
    }

    pub fn note_duration(&self) -> NoteDuration {
        self.duration
    }

    pub fn is_rest_mode(&self) -> bool {
        self.rest_mode
    }

    // Recording

    /// Record the selection as a new step and make it current. The
    /// selection is kept so the next step can start from it.
    pub fn record_step(&mut self) -> crate::Result<usize> {
        let recorded = self.store.record_step(self.selection.clone(), self.strum);
        let index = self.reject(recorded)?;
        log::debug!("recorded step {index} ({} notes)", self.selection.len());
        self.events.push_back(SessionEvent::StepChanged(Some(index)));
        Ok(index)
    }

    /// Replace the current step with the selection.
    pub fn update_current_step(&mut self) -> crate::Result<usize> {
        let updated = self.store.update_current(self.selection.clone(), self.strum);
        let index = self.reject(updated)?;
        self.events.push_back(SessionEvent::StepChanged(Some(index)));
        Ok(index)
    }

    /// Delete step `index`.
    pub fn remove_step(&mut self, index: usize) -> crate::Result<Step> {
        let removed = self.store.remove(index);
        let step = self.reject(removed)?;
        self.events
            .push_back(SessionEvent::StepChanged(self.store.cursor()));
        Ok(step)
    }

    // Transport settings

    pub fn set_tempo(&mut self, bpm: f64) -> crate::Result<()> {
        let result = self.config.set_tempo(bpm);
        self.reject(result)
    }

    pub fn set_time_signature(&mut self, beats_per_measure: u32, beat_unit: u32) -> crate::Result<()> {
        let signature = TimeSignature::new(beats_per_measure, beat_unit);
        self.config.time_signature = self.reject(signature)?;
        Ok(())
    }

    pub fn set_strum_direction(&mut self, direction: StrumDirection) {
        self.strum = direction;
    }

    pub fn strum_direction(&self) -> StrumDirection {
        self.strum
    }

    /// Clamped to [0, 1]; see [`TransportConfig::set_volume`].
    pub fn set_volume(&mut self, volume: f32) {
        self.config.set_volume(volume);
    }

    // Playback

    /// Play every recorded step from the top. Any run in progress is
    /// stopped first.
    pub fn play(&mut self) -> crate::Result<()> {
        self.transport.stop();
        let result = self
            .transport
            .play(self.store.steps(), &self.config, &mut self.effects);
        self.reject(result)
    }

    /// Stop playback and silence every note.
    pub fn stop(&mut self) {
        self.transport.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    /// Step the playhead is on, while playing.
    pub fn playing_step(&self) -> Option<usize> {
        self.transport.current_step()
    }

    /// Audio sink pull; see [`Transport::render_block`].
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.transport.render_block(out);
    }

    /// Playback notifications; see [`Transport::subscribe`].
    pub fn subscribe(&mut self, capacity: usize) -> Consumer<PlaybackEvent> {
        self.transport.subscribe(capacity)
    }

    /// Mark the audio sink as gone.
    pub fn close(&mut self) {
        self.transport.close();
    }

    // Navigation

    /// Make step `index` current and load its notes into the selection.
    pub fn goto_step(&mut self, index: usize) -> crate::Result<()> {
        let moved = self.store.move_to(index).cloned();
        let step = self.reject(moved)?;
        self.load(step);
        Ok(())
    }

    pub fn next(&mut self) -> crate::Result<()> {
        let moved = self.store.next().cloned();
        let step = self.reject(moved)?;
        self.load(step);
        Ok(())
    }

    pub fn previous(&mut self) -> crate::Result<()> {
        let moved = self.store.previous().cloned();
        let step = self.reject(moved)?;
        self.load(step);
        Ok(())
    }

    /// Make `step` the selection and strum it, unless a run is playing.
    fn load(&mut self, step: Step) {
        if !self.transport.is_playing() {
            if let Err(err) = self
                .transport
                .audition_step(&step, &self.config, &mut self.effects)
            {
                log::warn!("audition of step {:?} failed: {err}", self.store.cursor());
            }
        }
        self.selection = step.notes().to_vec();
        self.events
            .push_back(SessionEvent::StepChanged(self.store.cursor()));
        self.events.push_back(SessionEvent::SelectionChanged);
    }

    /// Current step, `None` before anything is recorded.
    pub fn current_step(&self) -> Option<usize> {
        self.store.cursor()
    }

    // Whole-document access

    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TransportConfig {
        &mut self.config
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// Chain edits apply to notes scheduled afterwards only.
    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Swap in a complete, validated document. Playback stops.
    pub(crate) fn load_document(&mut self, steps: Vec<Step>, config: TransportConfig) {
        self.transport.stop();
        self.store.replace_all(steps);
        self.config = config;
        self.selection.clear();
        self.events
            .push_back(SessionEvent::StepChanged(self.store.cursor()));
        self.events.push_back(SessionEvent::SelectionChanged);
    }

    /// Drain pending notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("steps", &self.store.len())
            .field("cursor", &self.store.cursor())
            .field("config", &self.config)
            .field("effects", &self.effects)
            .field("transport", &self.transport)
            .field("selection", &self.selection.len())
            .finish()
    }
}
