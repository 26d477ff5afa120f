//! Frame sequence assembly and hand-off to encoders.

/// Drives a composer over every frame, sequentially or in parallel chunks.
pub mod assembler;
/// Ordered frame storage, in memory or spooled to a temporary directory.
pub mod sequence;
