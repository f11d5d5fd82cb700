use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::MAX_QUALITY;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ElimError, ElimResult};
use crate::render::overlay::OverlayStyle;
use crate::scene::model::Preset;
use crate::scene::presets::{DEFAULT_MAX_DIMENSION, PresetKind};

/// User-supplied bill and coin sprite files.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SpritePaths {
    pub bill: PathBuf,
    pub coin: PathBuf,
}

/// Settings of one generation run, loadable from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub preset: PresetKind,
    /// Upper bound for the larger surface side.
    pub max_dimension: u32,
    /// GIF quantiser setting, `1..=30`, lower is better.
    pub quality: u8,
    /// `0` loops forever.
    pub loop_count: u16,
    /// Particle seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub overlay_color: [u8; 3],
    pub sprites: Option<SpritePaths>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            preset: PresetKind::Elimination,
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: 15,
            loop_count: 0,
            seed: None,
            overlay_color: [255, 0, 0],
            sprites: None,
        }
    }
}

impl RunConfig {
    pub fn from_path(path: &Path) -> ElimResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ElimResult<()> {
        if self.max_dimension == 0 || self.max_dimension > u32::from(u16::MAX) {
            return Err(ElimError::validation(format!(
                "max_dimension must be within 1..=65535, got {}",
                self.max_dimension
            )));
        }
        if !(1..=MAX_QUALITY).contains(&self.quality) {
            return Err(ElimError::validation(format!(
                "quality must be within 1..={MAX_QUALITY}, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Scene list for this run.
    pub fn preset(&self) -> Preset {
        let [r, g, b] = self.overlay_color;
        let overlay = OverlayStyle {
            color: Rgba8::opaque(r, g, b),
            ..OverlayStyle::red_cross()
        };
        self.preset.preset_with(self.max_dimension, overlay)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
