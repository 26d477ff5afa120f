/// Serde-backed animation configuration and the stock preset.
pub mod config;
/// Per-frame scene composition.
pub mod director;
/// Phase boundaries and local progress.
pub mod phase;
