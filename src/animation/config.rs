use std::path::{Path, PathBuf};

use crate::assets::loader::{AssetSpec, SizeTarget};
use crate::assets::subject::SubjectSource;
use crate::foundation::core::{CanvasSize, Fps, PixelPos, Rgba8Premul};
use crate::foundation::error::{SawcutError, SawcutResult};

const FRACTION_SUM_TOLERANCE: f64 = 1e-9;

/// Everything needed to build a [`crate::SceneDirector`]: canvas, timing, assets, layout and motion.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    /// Output canvas size.
    pub canvas: CanvasSize,
    /// Fill every frame starts from.
    #[serde(default = "default_fill")]
    pub fill: Rgba8Premul,
    /// Total duration in seconds.
    pub duration_secs: f64,
    /// Output frame rate.
    pub fps: Fps,
    /// Share of the duration each phase takes.
    pub phases: PhaseFractions,
    /// Asset sources and size targets.
    pub assets: SceneAssets,
    /// Where layers sit on the canvas.
    pub layout: Layout,
    /// Motion amplitudes.
    #[serde(default)]
    pub motion: MotionParams,
}

/// Per-phase duration fractions. Must be finite, non-negative and sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseFractions {
    /// Approach (camera shake).
    pub approach: f64,
    /// Subject sliding toward its rest position.
    pub profile_approach: f64,
    /// Tool sawing over the subject.
    pub cut: f64,
    /// Halves falling apart.
    pub split: f64,
}

impl PhaseFractions {
    /// Fractions in phase order.
    pub fn as_array(&self) -> [f64; 4] {
        [self.approach, self.profile_approach, self.cut, self.split]
    }

    /// Check every fraction is finite and non-negative and that they sum to 1 (within 1e-9).
    pub fn validate(&self) -> SawcutResult<()> {
        let fractions = self.as_array();
        if let Some(bad) = fractions.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(SawcutError::validation(format!(
                "phase fractions must be finite and >= 0, got {bad}"
            )));
        }
        let sum: f64 = fractions.iter().sum();
        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(SawcutError::validation(format!(
                "phase fractions must sum to 1, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Asset references for every scene layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneAssets {
    /// Backdrop drawn first on every frame.
    pub background: AssetSpec,
    /// Character drawn during the approach phase.
    #[serde(default)]
    pub actor: Option<AssetSpec>,
    /// Cutting tool drawn during the cut phase.
    pub tool: AssetSpec,
    /// Subject image source and size.
    pub subject: SubjectSpec,
}

/// Subject size plus an optional default source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectSpec {
    /// Image path used when the caller does not supply a subject.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Size the subject is normalized to.
    pub size: SizeTarget,
}

/// Placement rule for a layer, resolved against the canvas and the layer's own size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum Anchor {
    /// Centred on the canvas.
    Center,
    /// Explicit top-left position.
    TopLeft {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
    },
    /// Bottom-right corner inset by the given margins.
    BottomRight {
        /// Gap to the right canvas edge.
        margin_x: i32,
        /// Gap to the bottom canvas edge.
        margin_y: i32,
    },
}

impl Anchor {
    /// Top-left position of a `width` x `height` layer on `canvas`.
    pub fn resolve(&self, canvas: CanvasSize, width: u32, height: u32) -> PixelPos {
        let (cw, ch) = (i64::from(canvas.width), i64::from(canvas.height));
        let (w, h) = (i64::from(width), i64::from(height));
        let (x, y) = match *self {
            Self::Center => (cw / 2 - w / 2, ch / 2 - h / 2),
            Self::TopLeft { x, y } => (i64::from(x), i64::from(y)),
            Self::BottomRight { margin_x, margin_y } => {
                (cw - w - i64::from(margin_x), ch - h - i64::from(margin_y))
            }
        };
        PixelPos::new(clamp_i32(x), clamp_i32(y))
    }
}

/// Where each layer sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    /// Background placement.
    pub background: Anchor,
    /// Actor placement.
    pub actor: Anchor,
    /// Subject position while it is approaching.
    pub subject_start: Anchor,
    /// Subject position during the cut, and the origin of the split.
    pub subject_rest: Anchor,
}

/// Motion amplitudes for each phase.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionParams {
    /// Camera shake half-range in pixels during approach.
    pub shake_px: i32,
    /// Leading share of the approach during which the actor is visible.
    pub actor_share: f64,
    /// Share of the start-to-rest path covered by the end of the profile approach.
    pub approach_reach: f64,
    /// Tool swing amplitude in degrees.
    pub tool_swing_deg: f64,
    /// Tool side-to-side amplitude in pixels.
    pub tool_wiggle_px: f64,
    /// Tool downward travel in pixels over the cut.
    pub tool_drop_px: f64,
    /// Initial tilt of each half in degrees.
    pub split_base_deg: f64,
    /// Extra tilt gained over the split in degrees.
    pub split_swing_deg: f64,
    /// Distance the halves fall over the split in pixels.
    pub split_fall_px: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            shake_px: 5,
            actor_share: 0.5,
            approach_reach: 0.6,
            tool_swing_deg: 5.0,
            tool_wiggle_px: 5.0,
            tool_drop_px: 10.0,
            split_base_deg: 10.0,
            split_swing_deg: 20.0,
            split_fall_px: 150.0,
        }
    }
}

impl MotionParams {
    /// Reject negative shake, non-finite amplitudes and shares outside `[0, 1]`.
    pub fn validate(&self) -> SawcutResult<()> {
        if self.shake_px < 0 {
            return Err(SawcutError::validation("shake_px must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.approach_reach) {
            return Err(SawcutError::validation(
                "approach_reach must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.actor_share) {
            return Err(SawcutError::validation("actor_share must be within [0, 1]"));
        }
        let amplitudes = [
            self.tool_swing_deg,
            self.tool_wiggle_px,
            self.tool_drop_px,
            self.split_base_deg,
            self.split_swing_deg,
            self.split_fall_px,
        ];
        if amplitudes.iter().any(|v| !v.is_finite()) {
            return Err(SawcutError::validation("motion amplitudes must be finite"));
        }
        Ok(())
    }
}

impl AnimationConfig {
    /// The stock scene: 1280x720, 5 s at 30 fps, phases 0.2/0.2/0.2/0.4 and a 500x500 subject.
    ///
    /// The background image doubles as the actor, as in the stock scene.
    pub fn standard(background: impl Into<PathBuf>, tool: impl Into<PathBuf>) -> Self {
        let background = background.into();
        let canvas = CanvasSize {
            width: 1280,
            height: 720,
        };
        let subject_px: u32 = 500;
        let reference_px: f64 = 300.0;
        let (cw, ch, ps) = (
            canvas.width as i32,
            canvas.height as i32,
            subject_px as i32,
        );

        Self {
            canvas,
            fill: default_fill(),
            duration_secs: 5.0,
            fps: Fps { num: 30, den: 1 },
            phases: PhaseFractions {
                approach: 0.2,
                profile_approach: 0.2,
                cut: 0.2,
                split: 0.4,
            },
            assets: SceneAssets {
                background: AssetSpec {
                    source: background.clone(),
                    size: SizeTarget::Width {
                        px: (f64::from(canvas.width) * 0.8) as u32,
                    },
                    glow_alpha: 10,
                },
                actor: Some(AssetSpec {
                    source: background,
                    size: SizeTarget::Height {
                        px: (reference_px * 1.2) as u32,
                    },
                    glow_alpha: 20,
                }),
                tool: AssetSpec {
                    source: tool.into(),
                    size: SizeTarget::Width {
                        px: (reference_px * 0.8) as u32,
                    },
                    glow_alpha: 40,
                },
                subject: SubjectSpec {
                    source: None,
                    size: SizeTarget::Exact {
                        width: subject_px,
                        height: subject_px,
                    },
                },
            },
            layout: Layout {
                background: Anchor::Center,
                actor: Anchor::BottomRight {
                    margin_x: 50,
                    margin_y: 50,
                },
                subject_start: Anchor::TopLeft {
                    x: cw - ps / 2,
                    y: ch - ps - 300,
                },
                subject_rest: Anchor::TopLeft {
                    x: cw / 2 + 50 - ps / 2,
                    y: ch - ps - 300,
                },
            },
            motion: MotionParams::default(),
        }
    }

    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> SawcutResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON config. Unknown fields are rejected.
    pub fn from_json_str(text: &str) -> SawcutResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| SawcutError::validation(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Pretty JSON form, as accepted by [`Self::from_json_str`].
    pub fn to_json_pretty(&self) -> SawcutResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SawcutError::Other(anyhow::anyhow!("serialize config: {e}")))
    }

    /// Check every invariant the renderer relies on.
    pub fn validate(&self) -> SawcutResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SawcutError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(SawcutError::validation(format!(
                "duration_secs must be finite and > 0, got {}",
                self.duration_secs
            )));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        self.phases.validate()?;
        if self.total_frames() == 0 {
            return Err(SawcutError::validation(
                "duration x fps must yield at least one frame",
            ));
        }

        self.assets.background.size.validate()?;
        if let Some(actor) = &self.assets.actor {
            actor.size.validate()?;
        }
        self.assets.tool.size.validate()?;
        self.assets.subject.size.validate()?;
        self.motion.validate()
    }

    /// `floor(duration x fps)`, snapping float noise to the nearest integer first.
    pub fn total_frames(&self) -> u64 {
        self.fps.secs_to_frames_floor(self.duration_secs)
    }

    /// Subject source when the caller supplies none: the configured path, else a placeholder.
    pub fn default_subject(&self) -> SubjectSource {
        match &self.assets.subject.source {
            Some(path) => SubjectSource::Path(path.clone()),
            None => SubjectSource::Placeholder {
                label: "subject".to_owned(),
            },
        }
    }
}

fn default_fill() -> Rgba8Premul {
    Rgba8Premul::opaque(255, 255, 255)
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
#[path = "../../tests/unit/animation/config.rs"]
mod tests;
