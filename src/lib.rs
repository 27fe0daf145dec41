pub mod dsp; // Realtime primitives: oscillator, envelope, shapers
pub mod effects; // Effect units and the chain that hosts them
pub mod engine; // Scheduling, voices and the transport
pub mod error;
pub mod graph; // Composable per-note signal graph
pub mod sequencing; // Notes, steps, durations and strums
pub mod session;
#[cfg(feature = "serde")]
pub mod song; // JSON song files
pub mod tuning; // Fretboard positions to pitches

pub use error::{Error, Result};
pub use session::{Session, SessionEvent};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
