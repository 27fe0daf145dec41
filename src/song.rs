//! Song files.
//!
//! A song is saved as JSON:
//!
//! ```json
//! {
//!   "tempo": 120,
//!   "timeSignature": { "beatsPerMeasure": 4, "beatUnit": 4 },
//!   "volume": 0.5,
//!   "steps": [
//!     { "notes": [{ "string": 0, "fret": 3, "duration": "quarter", "isRest": false }],
//!       "strum": "down" }
//!   ],
//!   "effects": [
//!     { "name": "distortion", "enabled": true, "settings": { "distortionAmount": 20 } }
//!   ]
//! }
//! ```
//!
//! `effects` is a list so the chain order survives a save and reload.
//!
//! Older files store `setups` (one array of notes per step, each note
//! carrying the step's `strum`) and a `plugins` list instead; they are read
//! too. Either way a file is checked completely before anything in the
//! session changes, and one bad step rejects the whole file.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::effects::{EffectRegistry, EffectState, Settings};
use crate::engine::TransportConfig;
use crate::error::ValidationError;
use crate::sequencing::{
    note::{Note, Step, StrumDirection},
    sequence::SequenceStore,
    time_signature::TimeSignature,
};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub string: usize,
    pub fret: usize,
    pub duration: String,
    #[serde(default)]
    pub is_rest: bool,
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            string: note.string() as usize,
            fret: note.fret() as usize,
            duration: note.duration.name().to_string(),
            is_rest: note.is_rest,
        }
    }
}

impl NoteRecord {
    fn to_note(&self) -> Result<Note, ValidationError> {
        let duration = self.duration.parse()?;
        Note::new(self.string, self.fret, duration, self.is_rest)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub notes: Vec<NoteRecord>,
    #[serde(default)]
    pub strum: StrumDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongFile {
    pub tempo: f64,
    pub time_signature: TimeSignature,
    pub volume: f32,
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub effects: Vec<EffectState>,
}

/// A song file checked and converted, ready to swap in.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub steps: Vec<Step>,
    pub config: TransportConfig,
}

impl SongFile {
    /// Snapshot a document.
    pub fn capture(store: &SequenceStore, config: &TransportConfig, effects: &EffectRegistry) -> Self {
        Self {
            tempo: config.tempo_bpm(),
            time_signature: config.time_signature,
            volume: config.volume(),
            steps: store
                .steps()
                .iter()
                .map(|step| StepRecord {
                    notes: step.notes().iter().map(NoteRecord::from).collect(),
                    strum: step.strum(),
                })
                .collect(),
            effects: effects.settings(),
        }
    }

    /// Check every step and setting and build the session's values.
    ///
    /// Settings that are not stored in the file (strum delay, waveform,
    /// envelope) come from `base`.
    pub fn decode(&self, base: &TransportConfig) -> Result<Decoded, ValidationError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, record) in self.steps.iter().enumerate() {
            let step = record
                .notes
                .iter()
                .map(NoteRecord::to_note)
                .collect::<Result<Vec<_>, _>>()
                .and_then(|notes| Step::new(notes, record.strum))
                .map_err(|source| ValidationError::InvalidStep {
                    index,
                    source: Box::new(source),
                })?;
            steps.push(step);
        }

        let time_signature = TimeSignature::new(
            self.time_signature.beats_per_measure as u32,
            self.time_signature.beat_unit as u32,
        )?;
        let mut config = base.with_tempo(self.tempo)?.with_time_signature(time_signature);
        config.set_volume(self.volume);

        Ok(Decoded { steps, config })
    }

    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self).map_err(|e| ValidationError::MalformedSong(e.to_string()))
    }

    /// Parse a song in either the current or the older layout.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ValidationError::MalformedSong(e.to_string()))?;
        let malformed = |e: serde_json::Error| ValidationError::MalformedSong(e.to_string());

        if value.get("steps").is_some() {
            serde_json::from_value(value).map_err(malformed)
        } else if value.get("setups").is_some() {
            let legacy: LegacySong = serde_json::from_value(value).map_err(malformed)?;
            legacy.upgrade()
        } else {
            Err(ValidationError::MalformedSong(
                "expected a 'steps' or 'setups' list".to_string(),
            ))
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyNote {
    string: usize,
    fret: usize,
    duration: String,
    #[serde(default)]
    is_rest: bool,
    #[serde(default)]
    strum: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPlugin {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    settings: Settings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySong {
    tempo: f64,
    time_signature: TimeSignature,
    #[serde(default = "legacy_volume")]
    volume: f32,
    setups: Vec<Vec<LegacyNote>>,
    #[serde(default)]
    plugins: Vec<LegacyPlugin>,
}

fn legacy_volume() -> f32 {
    crate::engine::DEFAULT_VOLUME
}

impl LegacySong {
    fn upgrade(self) -> Result<SongFile, ValidationError> {
        let mut steps = Vec::with_capacity(self.setups.len());
        for (index, setup) in self.setups.into_iter().enumerate() {
            // The whole setup shares one strum; the first note carries it
            let strum = match setup.first().and_then(|n| n.strum.as_deref()) {
                Some(s) => s.parse().map_err(|source| ValidationError::InvalidStep {
                    index,
                    source: Box::new(source),
                })?,
                None => StrumDirection::default(),
            };
            let notes = setup
                .into_iter()
                .map(|n| NoteRecord {
                    string: n.string,
                    fret: n.fret,
                    duration: n.duration,
                    is_rest: n.is_rest,
                })
                .collect();
            steps.push(StepRecord { notes, strum });
        }

        let effects = self
            .plugins
            .into_iter()
            .filter_map(|p| match p.name {
                Some(name) => Some(EffectState {
                    name,
                    enabled: p.enabled.unwrap_or(true),
                    settings: p.settings,
                }),
                None => {
                    log::debug!("skipping unnamed plugin entry");
                    None
                }
            })
            .collect();

        Ok(SongFile {
            tempo: self.tempo,
            time_signature: self.time_signature,
            volume: self.volume,
            steps,
            effects,
        })
    }
}

impl Session {
    pub fn export_song(&self) -> SongFile {
        SongFile::capture(self.store(), self.config(), self.effects())
    }

    /// Replace the document with `song`. Nothing changes unless the whole
    /// file is valid.
    pub fn import_song(&mut self, song: &SongFile) -> crate::Result<()> {
        let decoded = song.decode(self.config());
        let Decoded { steps, config } = self.reject(decoded)?;
        let applied = self.effects_mut().apply_settings(&song.effects);
        self.reject(applied)?;

        log::info!(
            "imported song: {} steps at {} bpm",
            steps.len(),
            config.tempo_bpm()
        );
        self.load_document(steps, config);
        Ok(())
    }

    pub fn export_json(&self) -> crate::Result<String> {
        Ok(self.export_song().to_json()?)
    }

    pub fn import_json(&mut self, json: &str) -> crate::Result<()> {
        let song = SongFile::from_json(json);
        let song = self.reject(song)?;
        self.import_song(&song)
    }
}
