use crate::render::overlay::OverlayStyle;
use crate::scene::model::{CanvasPolicy, Preset, SceneSpec};
use crate::scene::particles::ParticleParams;

/// Default upper bound for the larger surface side.
pub const DEFAULT_MAX_DIMENSION: u32 = 800;

/// Built-in animation presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    /// Photo, red cross fading in, grayscale freeze.
    #[default]
    Elimination,
    /// Elimination followed by falling bills and coins.
    Celebration,
    /// One frame per uploaded image.
    Frames,
}

impl PresetKind {
    pub const ALL: [PresetKind; 3] = [Self::Elimination, Self::Celebration, Self::Frames];

    pub fn name(self) -> &'static str {
        match self {
            Self::Elimination => "elimination",
            Self::Celebration => "celebration",
            Self::Frames => "frames",
        }
    }

    /// Scene list with the default surface limit.
    pub fn preset(self) -> Preset {
        self.preset_with(DEFAULT_MAX_DIMENSION, OverlayStyle::red_cross())
    }

    /// Scene list for a given surface limit and overlay style.
    pub fn preset_with(self, max_dimension: u32, overlay: OverlayStyle) -> Preset {
        let canvas = CanvasPolicy::FitPrimary { max_dimension };
        let scenes = match self {
            Self::Elimination => vec![
                SceneSpec::Hold { delay_ms: 2000 },
                SceneSpec::FadeOverlay {
                    frames: 15,
                    total_ms: 2000,
                },
                SceneSpec::GrayscaleFreeze {
                    repeats: 3,
                    delay_ms: 1000,
                },
            ],
            Self::Celebration => vec![
                SceneSpec::Hold { delay_ms: 2000 },
                SceneSpec::FadeOverlay {
                    frames: 20,
                    total_ms: 2000,
                },
                SceneSpec::GrayscaleFreeze {
                    repeats: 4,
                    delay_ms: 500,
                },
                SceneSpec::ParticleFall(ParticleParams::default()),
            ],
            Self::Frames => vec![SceneSpec::FrameSequence { delay_ms: 200 }],
        };
        Preset {
            name: self.name().to_string(),
            canvas,
            overlay,
            scenes,
        }
    }
}

impl std::fmt::Display for PresetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PresetKind {
    type Err = crate::foundation::error::ElimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::foundation::error::ElimError::validation(format!(
                    "unknown preset '{s}' (expected elimination, celebration or frames)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/presets.rs"]
mod tests;
