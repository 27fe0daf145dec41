//! The contract between an effect and the chain that hosts it.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PluginError;
use crate::graph::node::{GraphNode, Silence};
use crate::sequencing::note::Note;

/// One effect parameter value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl Param {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Param::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Param::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Param::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Number(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Flag(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

/// Named parameters of one unit, ordered by key.
pub type Settings = BTreeMap<String, Param>;

/// Build [`Settings`] from `(key, value)` pairs.
pub fn settings<K, V, I>(pairs: I) -> Settings
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Param>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Read a numeric setting and check it against `range`.
///
/// `Ok(None)` when the key is absent.
pub fn number_in(
    unit: &str,
    settings: &Settings,
    key: &str,
    range: std::ops::RangeInclusive<f64>,
) -> Result<Option<f64>, PluginError> {
    let Some(param) = settings.get(key) else {
        return Ok(None);
    };
    let value = param.as_number().ok_or_else(|| PluginError::InvalidSetting {
        name: unit.to_string(),
        key: key.to_string(),
        reason: "expected a number".to_string(),
    })?;
    if !value.is_finite() || !range.contains(&value) {
        return Err(PluginError::InvalidSetting {
            name: unit.to_string(),
            key: key.to_string(),
            reason: format!(
                "{value} is outside {}..={}",
                range.start(),
                range.end()
            ),
        });
    }
    Ok(Some(value))
}

/// Read a boolean setting. `Ok(None)` when the key is absent.
pub fn flag(unit: &str, settings: &Settings, key: &str) -> Result<Option<bool>, PluginError> {
    match settings.get(key) {
        None => Ok(None),
        Some(param) => param
            .as_flag()
            .map(Some)
            .ok_or_else(|| PluginError::InvalidSetting {
                name: unit.to_string(),
                key: key.to_string(),
                reason: "expected true or false".to_string(),
            }),
    }
}

/// What an effect may know about the note it is shaping.
#[derive(Debug, Clone, Copy)]
pub struct NoteContext {
    pub note: Note,
    /// Index of the step the note belongs to.
    pub step: usize,
    /// Pitch before any effect, in Hz.
    pub frequency: f64,
    pub sample_rate: f32,
}

/// The per-note signal graph an effect chain transforms.
pub struct Signal {
    node: Box<dyn GraphNode>,
}

impl Signal {
    pub fn new(node: Box<dyn GraphNode>) -> Self {
        Self { node }
    }

    /// Replace the graph with `f(graph)`.
    pub fn wrap<N, F>(&mut self, f: F)
    where
        N: GraphNode + 'static,
        F: FnOnce(Box<dyn GraphNode>) -> N,
    {
        let inner = std::mem::replace(&mut self.node, Box::new(Silence));
        self.node = Box::new(f(inner));
    }

    pub fn into_node(self) -> Box<dyn GraphNode> {
        self.node
    }
}

/// An audio effect hosted by the [`EffectRegistry`](super::EffectRegistry).
///
/// Units are pure functions of their own settings plus the note context.
/// `process` must either wrap the signal or return an error, never both:
/// the chain relies on a failing unit leaving the signal untouched.
pub trait EffectUnit: Send {
    /// Kind of unit, e.g. `"distortion"`.
    fn name(&self) -> &'static str;

    /// Called once when the unit is installed.
    fn init(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Transform one note's signal. Leaving it alone is a pass-through.
    fn process(&self, signal: &mut Signal, ctx: &NoteContext) -> Result<(), PluginError>;

    fn settings(&self) -> Settings;

    /// Check `settings` without applying anything. Unknown keys are allowed.
    fn validate_settings(&self, settings: &Settings) -> Result<(), PluginError>;

    /// Validate then apply. On error nothing changes.
    fn apply_settings(&mut self, settings: &Settings) -> Result<(), PluginError>;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Overrides stored for one note position, if the unit supports them.
    fn note_settings(&self, _note: &Note) -> Option<Settings> {
        None
    }

    fn apply_note_settings(&mut self, _note: &Note, _settings: &Settings) -> Result<(), PluginError> {
        Err(PluginError::NoteSettingsUnsupported(self.name().to_string()))
    }

    fn clear_note_settings(&mut self, _note: &Note) {}
}
