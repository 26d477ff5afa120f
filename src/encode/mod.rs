//! Encoding sinks.
//!
//! Sinks consume a finished frame sequence in order; see `Assembler::render`.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
