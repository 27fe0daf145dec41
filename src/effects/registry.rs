use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::unit::{EffectUnit, NoteContext, Settings, Signal};
use crate::error::PluginError;
use crate::sequencing::note::Note;

/// Persisted state of one installed unit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default = "enabled_by_default"))]
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub settings: Settings,
}

#[cfg(feature = "serde")]
fn enabled_by_default() -> bool {
    true
}

struct Slot {
    name: String,
    unit: Box<dyn EffectUnit>,
}

/// Ordered chain of effect units, keyed by install name.
///
/// A note's signal flows through the enabled units in chain order. The
/// order is part of the persisted state: [`EffectRegistry::settings`]
/// lists units in chain order and [`EffectRegistry::apply_settings`]
/// restores it.
#[derive(Default)]
pub struct EffectRegistry {
    slots: Vec<Slot>,
    faults: Vec<PluginError>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    fn slot(&self, name: &str) -> Result<&Slot, PluginError> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PluginError::UnknownEffect(name.to_string()))
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Slot, PluginError> {
        self.slots
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| PluginError::UnknownEffect(name.to_string()))
    }

    fn initialised(name: &str, mut unit: Box<dyn EffectUnit>) -> Result<Box<dyn EffectUnit>, PluginError> {
        unit.init().map_err(|err| PluginError::InitFailed {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
        Ok(unit)
    }

    /// Append `unit` to the end of the chain under `name`.
    ///
    /// Rejects a name already in use. A unit whose `init` fails is not
    /// added and the chain is left as it was.
    pub fn install(
        &mut self,
        name: impl Into<String>,
        unit: Box<dyn EffectUnit>,
    ) -> Result<(), PluginError> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(PluginError::DuplicateName(name));
        }
        let unit = Self::initialised(&name, unit)?;
        log::info!("installed effect '{name}' ({})", unit.name());
        self.slots.push(Slot { name, unit });
        Ok(())
    }

    /// Swap the unit installed under `name`, keeping its chain position.
    pub fn replace(
        &mut self,
        name: &str,
        unit: Box<dyn EffectUnit>,
    ) -> Result<Box<dyn EffectUnit>, PluginError> {
        let index = self
            .position(name)
            .ok_or_else(|| PluginError::UnknownEffect(name.to_string()))?;
        let unit = Self::initialised(name, unit)?;
        log::info!("replaced effect '{name}' with {}", unit.name());
        Ok(std::mem::replace(&mut self.slots[index].unit, unit))
    }

    /// Remove the unit called `name`. Absent names are ignored.
    pub fn uninstall(&mut self, name: &str) -> Option<Box<dyn EffectUnit>> {
        let index = self.position(name)?;
        log::info!("uninstalled effect '{name}'");
        Some(self.slots.remove(index).unit)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PluginError> {
        self.slot_mut(name)?.unit.set_enabled(enabled);
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.slot(name).ok().map(|s| s.unit.is_enabled())
    }

    /// Run `signal` through every enabled unit in chain order.
    ///
    /// A unit that fails is disabled, logged and recorded in
    /// [`faults`](Self::faults); the signal carries on through the rest of
    /// the chain.
    pub fn process(&mut self, signal: &mut Signal, ctx: &NoteContext) {
        for slot in self.slots.iter_mut() {
            if !slot.unit.is_enabled() {
                continue;
            }
            if let Err(err) = slot.unit.process(signal, ctx) {
                log::warn!("effect '{}' failed and was disabled: {err}", slot.name);
                slot.unit.set_enabled(false);
                self.faults.push(err);
            }
        }
    }

    /// Faults recorded by [`process`](Self::process) since the last
    /// [`take_faults`](Self::take_faults).
    pub fn faults(&self) -> &[PluginError] {
        &self.faults
    }

    pub fn take_faults(&mut self) -> Vec<PluginError> {
        std::mem::take(&mut self.faults)
    }

    /// State of every unit, in chain order.
    pub fn settings(&self) -> Vec<EffectState> {
        self.slots
            .iter()
            .map(|s| EffectState {
                name: s.name.clone(),
                enabled: s.unit.is_enabled(),
                settings: s.unit.settings(),
            })
            .collect()
    }

    /// Restore persisted state.
    ///
    /// Every entry naming an installed unit is validated before any is
    /// applied, so a bad entry leaves the whole chain untouched. Entries for
    /// units that are not installed are skipped. Installed units are then
    /// reordered to follow `states`; units it does not mention keep their
    /// relative order after the listed ones.
    pub fn apply_settings(&mut self, states: &[EffectState]) -> Result<(), PluginError> {
        for state in states {
            match self.slot(&state.name) {
                Ok(slot) => slot.unit.validate_settings(&state.settings)?,
                Err(_) => log::debug!("ignoring settings for unknown effect '{}'", state.name),
            }
        }

        for state in states {
            if let Ok(slot) = self.slot_mut(&state.name) {
                slot.unit.apply_settings(&state.settings)?;
                slot.unit.set_enabled(state.enabled);
            }
        }

        let rank: HashMap<&str, usize> = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), i))
            .collect();
        // Stable sort: unlisted units share the last rank and keep their order
        self.slots
            .sort_by_key(|s| rank.get(s.name.as_str()).copied().unwrap_or(usize::MAX));
        Ok(())
    }

    pub fn note_settings(&self, name: &str, note: &Note) -> Result<Option<Settings>, PluginError> {
        Ok(self.slot(name)?.unit.note_settings(note))
    }

    pub fn apply_note_settings(
        &mut self,
        name: &str,
        note: &Note,
        settings: &Settings,
    ) -> Result<(), PluginError> {
        self.slot_mut(name)?.unit.apply_note_settings(note, settings)
    }

    pub fn clear_note_settings(&mut self, name: &str, note: &Note) -> Result<(), PluginError> {
        self.slot_mut(name)?.unit.clear_note_settings(note);
        Ok(())
    }

    /// Install names in chain order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("chain", &self.names().collect::<Vec<_>>())
            .field("faults", &self.faults.len())
            .finish()
    }
}
