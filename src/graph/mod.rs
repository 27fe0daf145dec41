//! Composable building blocks for per-note signal graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what a sounding note
//! needs: note events, a forced fade, and block-based rendering. Effect
//! units transform a note by wrapping its graph in further nodes.

/// Multiply two signals together (gain envelopes).
pub mod amplify;
/// Gate envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, `.boxed()`).
pub mod extensions;
/// Core traits shared by all graph nodes.
pub mod node;
/// Pitched oscillator node.
pub mod oscillator;
/// Serial chaining of two nodes (source → processor).
pub mod through;

pub use extensions::NodeExt;
pub use node::{GraphNode, RenderCtx};
