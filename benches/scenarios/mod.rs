//! Engine scenario benchmarks.
//!
//! Complete per-note chains as the transport builds them, schedule
//! construction for long songs, and whole runs rendered offline.

mod transport;
mod voices;

pub use transport::{bench_schedule, bench_transport};
pub use voices::bench_voices;
