use crate::foundation::core::Canvas;
use crate::foundation::error::{ElimError, ElimResult};
use crate::render::overlay::OverlayStyle;
use crate::scene::particles::ParticleParams;

/// One stage of an animation. Scenes run in the order their [`Preset`] lists them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum SceneSpec {
    /// Single frame of the unmodified source, held for a long delay.
    Hold { delay_ms: u32 },
    /// `frames` frames spanning `total_ms`; overlay alpha ramps `1/N, 2/N, .., 1`.
    FadeOverlay { frames: u32, total_ms: u32 },
    /// `repeats` identical frames: grayscale source plus the overlay at full opacity.
    GrayscaleFreeze { repeats: u32, delay_ms: u32 },
    /// Grayscale + overlay background with falling bill/coin sprites.
    ParticleFall(ParticleParams),
    /// One frame per uploaded source image, in upload order.
    FrameSequence { delay_ms: u32 },
}

impl SceneSpec {
    /// Stable scene name used in logs and plans.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hold { .. } => "hold",
            Self::FadeOverlay { .. } => "fade-overlay",
            Self::GrayscaleFreeze { .. } => "grayscale-freeze",
            Self::ParticleFall(_) => "particle-fall",
            Self::FrameSequence { .. } => "frame-sequence",
        }
    }

    /// Number of frames this scene emits; `sequence_len` is the number of uploaded frames.
    pub fn frame_count(&self, sequence_len: usize) -> u32 {
        match self {
            Self::Hold { .. } => 1,
            Self::FadeOverlay { frames, .. } => *frames,
            Self::GrayscaleFreeze { repeats, .. } => *repeats,
            Self::ParticleFall(p) => p.frames,
            Self::FrameSequence { .. } => u32::try_from(sequence_len).unwrap_or(u32::MAX),
        }
    }

    /// Display duration of each frame of this scene.
    pub fn frame_delay_ms(&self) -> u32 {
        match self {
            Self::Hold { delay_ms }
            | Self::GrayscaleFreeze { delay_ms, .. }
            | Self::FrameSequence { delay_ms } => *delay_ms,
            Self::FadeOverlay { frames, total_ms } => {
                (f64::from(*total_ms) / f64::from((*frames).max(1))).round() as u32
            }
            Self::ParticleFall(p) => p.delay_ms,
        }
    }

    pub fn validate(&self) -> ElimResult<()> {
        match self {
            Self::FadeOverlay { frames: 0, .. } => Err(ElimError::validation(
                "fade-overlay scene needs at least one frame",
            )),
            Self::GrayscaleFreeze { repeats: 0, .. } => Err(ElimError::validation(
                "grayscale-freeze scene needs at least one repeat",
            )),
            Self::ParticleFall(p) => p.validate(),
            _ => Ok(()),
        }
    }
}

/// Overlay opacity on frame `i` (1-based) of an `n`-frame fade.
pub fn fade_opacity(i: u32, n: u32) -> f64 {
    if n == 0 {
        return 1.0;
    }
    f64::from(i.min(n)) / f64::from(n)
}

/// How the drawing surface size is chosen for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CanvasPolicy {
    /// Primary source scaled so its larger side is at most `max_dimension`.
    FitPrimary { max_dimension: u32 },
    /// Fixed surface, independent of the source size.
    Fixed { width: u32, height: u32 },
}

impl CanvasPolicy {
    pub fn resolve(self, primary_width: u32, primary_height: u32) -> ElimResult<Canvas> {
        match self {
            Self::FitPrimary { max_dimension } => {
                Canvas::fit_within(primary_width, primary_height, max_dimension)
            }
            Self::Fixed { width, height } => Canvas::new(width, height),
        }
    }
}

/// An ordered list of scenes plus the shared overlay and sizing rules.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Preset {
    pub name: String,
    pub canvas: CanvasPolicy,
    pub overlay: OverlayStyle,
    pub scenes: Vec<SceneSpec>,
}

/// Frame count and delay of one scene, as scheduled for a run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PlannedScene {
    pub name: &'static str,
    pub frames: u32,
    pub delay_ms: u32,
}

impl Preset {
    pub fn validate(&self) -> ElimResult<()> {
        if self.scenes.is_empty() {
            return Err(ElimError::validation(format!(
                "preset '{}' has no scenes",
                self.name
            )));
        }
        for scene in &self.scenes {
            scene.validate()?;
        }
        Ok(())
    }

    /// Whether any scene consumes the full uploaded frame list.
    pub fn uses_sequence(&self) -> bool {
        self.scenes
            .iter()
            .any(|s| matches!(s, SceneSpec::FrameSequence { .. }))
    }

    /// Per-scene frame counts and delays; randomness never changes these.
    pub fn plan(&self, sequence_len: usize) -> Vec<PlannedScene> {
        self.scenes
            .iter()
            .map(|s| PlannedScene {
                name: s.name(),
                frames: s.frame_count(sequence_len),
                delay_ms: s.frame_delay_ms(),
            })
            .collect()
    }

    pub fn total_frames(&self, sequence_len: usize) -> u64 {
        self.plan(sequence_len)
            .iter()
            .map(|p| u64::from(p.frames))
            .sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
