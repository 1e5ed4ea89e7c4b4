//! Process-wide observability wiring.

pub mod tracing;

pub use tracing::init;
