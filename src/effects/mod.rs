//! Effect chain: the registry and the built-in units.
//!
//! Each sounding note gets its own signal graph. When a note is scheduled,
//! the registry passes that graph through every enabled unit, and each unit
//! wraps it in the nodes that realise its effect. The note then owns the
//! result, so later settings changes never reach a note already scheduled.

/// Pitch bend and vibrato.
pub mod bend;
/// Waveshaping distortion.
pub mod distortion;
/// Ordered, named chain of units.
pub mod registry;
/// The unit contract, settings and the signal being transformed.
pub mod unit;

pub use bend::{Bend, BendParams};
pub use distortion::Distortion;
pub use registry::{EffectRegistry, EffectState};
pub use unit::{EffectUnit, NoteContext, Param, Settings, Signal};

/// Registry with the built-in units installed under their own names:
/// distortion first, then bend. Both start disabled.
pub fn default_chain() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    let units: [Box<dyn EffectUnit>; 2] = [Box::new(Distortion::new()), Box::new(Bend::new())];
    for mut unit in units {
        unit.set_enabled(false);
        let name = unit.name();
        if let Err(err) = registry.install(name, unit) {
            log::warn!("built-in effect '{name}' not installed: {err}");
        }
    }
    registry
}
