//! Per-frame scene composition.
//!
//! A [`Scene`] holds the static layers, loaded once. [`SceneDirector`] turns a frame index plus a
//! per-frame RNG into a finished [`Canvas`]; it never mutates the scene, so frames can be composed
//! in any order and on any thread.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use rand::rngs::StdRng;

use crate::animation::config::{AnimationConfig, Anchor};
use crate::animation::phase::{Phase, PhaseTimeline};
use crate::assets::loader::load_asset;
use crate::assets::subject::SubjectSource;
use crate::effects::droplets::apply_droplet_overlay;
use crate::foundation::core::{CanvasSize, Fps, FrameIndex, PixelPos, PixelRect, Vec2};
use crate::foundation::error::SawcutResult;
use crate::render::canvas::Canvas;
use crate::render::layer::Layer;
use crate::render::transform::{lerp_point, rotate, split_vertical_halves};

/// Anything that can produce frame `i` of a fixed-length sequence.
///
/// Implementations must be deterministic given the frame index and the RNG state.
pub trait FrameComposer: Send + Sync {
    /// Number of frames in the sequence.
    fn total_frames(&self) -> u64;
    /// Canvas size of every frame.
    fn size(&self) -> CanvasSize;
    /// Playback rate handed to the encoder.
    fn fps(&self) -> Fps;
    /// Compose one frame.
    fn compose(&self, frame: FrameIndex, rng: &mut StdRng) -> SawcutResult<Canvas>;
}

/// Static layers, positioned once.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Backdrop, anchored.
    pub background: Layer,
    /// Optional character, anchored.
    pub actor: Option<Layer>,
    /// Unrotated tool; positioned per frame.
    pub tool: Layer,
    /// Subject image; positioned per frame.
    pub subject: Layer,
    /// Subject top-left while approaching.
    pub subject_start: PixelPos,
    /// Subject top-left at rest.
    pub subject_rest: PixelPos,
}

impl Scene {
    /// Load every asset named by `cfg` and resolve `subject`.
    ///
    /// Fails with an asset load error before any frame exists.
    #[tracing::instrument(skip_all)]
    pub fn load(cfg: &AnimationConfig, subject: &SubjectSource) -> SawcutResult<Self> {
        let background = load_asset(&cfg.assets.background)?;
        let actor = cfg.assets.actor.as_ref().map(load_asset).transpose()?;
        let tool = load_asset(&cfg.assets.tool)?;
        let subject = subject.resolve(&cfg.assets.subject.size)?;
        tracing::info!(
            subject_w = subject.width(),
            subject_h = subject.height(),
            actor = actor.is_some(),
            "scene assets ready"
        );
        Ok(Self::from_layers(cfg, background, actor, tool, subject))
    }

    /// Position already decoded layers according to `cfg.layout`.
    pub fn from_layers(
        cfg: &AnimationConfig,
        background: Layer,
        actor: Option<Layer>,
        tool: Layer,
        subject: Layer,
    ) -> Self {
        let layout = &cfg.layout;
        let place = |layer: Layer, anchor: &Anchor| {
            let pos = anchor.resolve(cfg.canvas, layer.width(), layer.height());
            layer.placed_at(pos)
        };
        let subject_start = layout
            .subject_start
            .resolve(cfg.canvas, subject.width(), subject.height());
        let subject_rest = layout
            .subject_rest
            .resolve(cfg.canvas, subject.width(), subject.height());

        Self {
            background: place(background, &layout.background),
            actor: actor.map(|a| place(a, &layout.actor)),
            tool,
            subject,
            subject_start,
            subject_rest,
        }
    }

    /// Subject bounding box at rest; the droplet origin region.
    pub fn rest_rect(&self) -> PixelRect {
        PixelRect {
            x: self.subject_rest.x,
            y: self.subject_rest.y,
            width: self.subject.width(),
            height: self.subject.height(),
        }
    }
}

/// Composes the four-phase animation over a [`Scene`].
#[derive(Clone, Debug)]
pub struct SceneDirector {
    scene: Scene,
    timeline: PhaseTimeline,
    cfg: AnimationConfig,
}

impl SceneDirector {
    /// Validate `cfg` and build the phase timeline.
    pub fn new(cfg: &AnimationConfig, scene: Scene) -> SawcutResult<Self> {
        cfg.validate()?;
        let timeline = PhaseTimeline::new(&cfg.phases, cfg.total_frames())?;
        Ok(Self {
            scene,
            timeline,
            cfg: cfg.clone(),
        })
    }

    /// Load assets and build a director in one step.
    pub fn load(cfg: &AnimationConfig, subject: &SubjectSource) -> SawcutResult<Self> {
        cfg.validate()?;
        let scene = Scene::load(cfg, subject)?;
        Self::new(cfg, scene)
    }

    /// Phase boundaries.
    pub fn timeline(&self) -> &PhaseTimeline {
        &self.timeline
    }

    /// The static layers.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn approach(&self, canvas: &mut Canvas, local: f64, rng: &mut StdRng) {
        if let Some(actor) = &self.scene.actor
            && local < self.cfg.motion.actor_share
        {
            canvas.draw(actor);
        }
        canvas.composite(&self.scene.subject, self.scene.subject_start);
        // Tool waits unrotated where the cut begins.
        let tool = self
            .scene
            .tool
            .clone()
            .centered_on(self.scene.rest_rect().center());
        canvas.draw(&tool);

        let shake = self.cfg.motion.shake_px;
        let dx = rng.random_range(-shake..=shake);
        let dy = rng.random_range(-shake..=shake);
        canvas.affine_jitter(dx, dy);
    }

    fn profile_approach(&self, canvas: &mut Canvas, local: f64) {
        let at = lerp_point(
            local * self.cfg.motion.approach_reach,
            self.scene.subject_start.to_point(),
            self.scene.subject_rest.to_point(),
        );
        canvas.composite(&self.scene.subject, PixelPos::from_point(at));
    }

    fn cut(&self, canvas: &mut Canvas, local: f64) -> SawcutResult<()> {
        let motion = &self.cfg.motion;
        canvas.composite(&self.scene.subject, self.scene.subject_rest);

        let angle = motion.tool_swing_deg * (local * TAU).sin();
        let offset = Vec2::new(
            motion.tool_wiggle_px * (local * PI).sin(),
            motion.tool_drop_px * local,
        );
        let tool = rotate(&self.scene.tool, angle, true)?
            .centered_on(self.scene.rest_rect().center() + offset);
        canvas.draw(&tool);
        Ok(())
    }

    fn split(&self, canvas: &mut Canvas, local: f64, rng: &mut StdRng) -> SawcutResult<()> {
        let motion = &self.cfg.motion;
        let resting = self.scene.subject.clone().placed_at(self.scene.subject_rest);
        let (left, right) = split_vertical_halves(&resting)?;

        let tilt = motion.split_base_deg + motion.split_swing_deg * local;
        let spread = f64::from(self.scene.subject.width()) * local;
        let fall = motion.split_fall_px * local;

        let left_at = left.center() + Vec2::new(-spread, fall);
        let right_at = right.center() + Vec2::new(spread, fall);
        canvas.draw(&rotate(&left, -tilt, true)?.centered_on(left_at));
        canvas.draw(&rotate(&right, tilt, true)?.centered_on(right_at));

        let drops = apply_droplet_overlay(canvas, self.scene.rest_rect(), rng)?;
        tracing::trace!(count = drops.len(), "droplets drawn");
        Ok(())
    }
}

impl FrameComposer for SceneDirector {
    fn total_frames(&self) -> u64 {
        self.timeline.total_frames()
    }

    fn size(&self) -> CanvasSize {
        self.cfg.canvas
    }

    fn fps(&self) -> Fps {
        self.cfg.fps
    }

    fn compose(&self, frame: FrameIndex, rng: &mut StdRng) -> SawcutResult<Canvas> {
        let progress = self.timeline.locate(frame)?;
        let mut canvas = Canvas::with_size(self.cfg.canvas, self.cfg.fill)?;
        canvas.draw(&self.scene.background);

        match progress.phase {
            Phase::Approach => self.approach(&mut canvas, progress.local, rng),
            Phase::ProfileApproach => self.profile_approach(&mut canvas, progress.local),
            Phase::Cut => self.cut(&mut canvas, progress.local)?,
            Phase::Split => self.split(&mut canvas, progress.local, rng)?,
        }
        Ok(canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/director.rs"]
mod tests;
