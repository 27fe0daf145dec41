//! Playback: configuration, scheduling, voices and the transport.

pub mod config;
pub mod scheduler;
pub mod transport;
pub mod voice;

pub use config::{EnvelopeShape, TransportConfig, DEFAULT_TEMPO, DEFAULT_VOLUME};
pub use scheduler::{Schedule, ScheduledNote};
pub use transport::{PlaybackEvent, Transport, TransportState, STOP_FADE};
pub use voice::{Gate, Voice, VoiceId};
