use crate::animation::config::PhaseFractions;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{SawcutError, SawcutResult};
use crate::foundation::math::snapped_ceil;

/// The four animation stages, in timeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Background, actor, waiting tool and subject under a camera shake.
    Approach,
    /// Subject slides toward its rest position.
    ProfileApproach,
    /// Tool saws over the resting subject.
    Cut,
    /// Halves fall apart with a droplet overlay.
    Split,
}

impl Phase {
    /// All phases in order.
    pub const ALL: [Phase; 4] = [
        Phase::Approach,
        Phase::ProfileApproach,
        Phase::Cut,
        Phase::Split,
    ];

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Approach => "approach",
            Self::ProfileApproach => "profile_approach",
            Self::Cut => "cut",
            Self::Split => "split",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Where a frame falls on the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseProgress {
    /// Owning phase.
    pub phase: Phase,
    /// Normalized position inside the phase, in `[0, 1)`.
    pub local: f64,
}

/// Phase boundaries for a fixed frame count.
///
/// Boundary `k` is `ceil(cum_k * total)` (float noise snapped), so each phase owns the half-open
/// interval of frames whose global progress lies in `[cum_k, cum_k+1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTimeline {
    total_frames: u64,
    fractions: [f64; 4],
    cumulative: [f64; 5],
    bounds: [u64; 5],
}

impl PhaseTimeline {
    /// Build boundaries from validated fractions.
    pub fn new(fractions: &PhaseFractions, total_frames: u64) -> SawcutResult<Self> {
        fractions.validate()?;
        if total_frames == 0 {
            return Err(SawcutError::validation(
                "phase timeline needs at least one frame",
            ));
        }

        let fractions = fractions.as_array();
        let mut cumulative = [0.0f64; 5];
        let mut bounds = [0u64; 5];
        for (k, f) in fractions.iter().enumerate() {
            cumulative[k + 1] = cumulative[k] + f;
            let b = snapped_ceil(cumulative[k + 1] * total_frames as f64).max(0.0) as u64;
            bounds[k + 1] = b.clamp(bounds[k], total_frames);
        }
        bounds[4] = total_frames;
        cumulative[4] = 1.0;

        Ok(Self {
            total_frames,
            fractions,
            cumulative,
            bounds,
        })
    }

    /// Frame count covered by the timeline.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Half-open frame interval owned by `phase`. Empty when its fraction is zero.
    pub fn frame_range(&self, phase: Phase) -> FrameRange {
        let k = phase.index();
        FrameRange {
            start: FrameIndex(self.bounds[k]),
            end: FrameIndex(self.bounds[k + 1]),
        }
    }

    /// All phases with their frame intervals, in order.
    pub fn ranges(&self) -> impl Iterator<Item = (Phase, FrameRange)> + '_ {
        Phase::ALL.into_iter().map(|p| (p, self.frame_range(p)))
    }

    /// Phase and local progress of `frame`. Pure: the same frame always maps to the same answer.
    pub fn locate(&self, frame: FrameIndex) -> SawcutResult<PhaseProgress> {
        if frame.0 >= self.total_frames {
            return Err(SawcutError::validation(format!(
                "frame {} is outside the timeline of {} frames",
                frame.0, self.total_frames
            )));
        }

        let k = (0..4)
            .find(|&k| self.bounds[k] <= frame.0 && frame.0 < self.bounds[k + 1])
            .ok_or_else(|| {
                SawcutError::validation(format!("frame {} is not owned by any phase", frame.0))
            })?;

        let global = frame.0 as f64 / self.total_frames as f64;
        let local = (global - self.cumulative[k]) / self.fractions[k];
        Ok(PhaseProgress {
            phase: Phase::ALL[k],
            local: local.clamp(0.0, 1.0 - f64::EPSILON),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/phase.rs"]
mod tests;
