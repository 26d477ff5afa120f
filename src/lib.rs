//! Sawcut renders a short four-phase cut-and-split animation of a subject image to video.
//!
//! The crate is frame-oriented:
//!
//! - Load an [`AnimationConfig`] (or start from [`AnimationConfig::standard`])
//! - Build a [`SceneDirector`] from the config and a [`SubjectSource`]
//! - Drive it with an [`Assembler`] into a [`FrameSink`] such as [`FfmpegSink`]
//!
//! Every frame is composed on a fresh premultiplied RGBA8 [`Canvas`] with its own seeded RNG, so
//! sequential and parallel runs produce identical pixels.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Configuration, phase timeline and per-frame composition.
pub mod animation;
/// Asset decoding, normalization and the subject provider.
pub mod assets;
/// Pixel effects: blur, blending and droplets.
pub mod effects;
/// Encoding sinks.
pub mod encode;
/// Canvas, layers and geometric transforms.
pub mod render;
/// Frame sequence assembly.
pub mod session;

pub use crate::foundation::core::{
    Affine, CanvasSize, Fps, FrameIndex, FrameRange, PixelPos, PixelRect, Point, Rect,
    Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{SawcutError, SawcutResult};
pub use crate::foundation::math::frame_seed;

pub use crate::animation::config::{
    AnimationConfig, Anchor, Layout, MotionParams, PhaseFractions, SceneAssets, SubjectSpec,
};
pub use crate::animation::director::{FrameComposer, Scene, SceneDirector};
pub use crate::animation::phase::{Phase, PhaseProgress, PhaseTimeline};
pub use crate::assets::loader::{AssetSpec, SizeTarget};
pub use crate::assets::subject::SubjectSource;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::canvas::Canvas;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::layer::Layer;
pub use crate::session::assembler::{Assembler, AssemblerOpts, CancelToken, RenderStats};
pub use crate::session::sequence::FrameSequence;
