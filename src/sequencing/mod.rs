pub mod duration;
pub mod note;
pub mod sequence;
pub mod strum;
pub mod time_signature;

pub use duration::NoteDuration;
pub use note::{Note, Step, StrumDirection, NUM_FRETS, NUM_STRINGS};
pub use sequence::SequenceStore;
pub use strum::{StrumOrder, DEFAULT_STRUM_DELAY};
pub use time_signature::TimeSignature;
