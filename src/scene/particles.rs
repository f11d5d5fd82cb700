use rand::Rng;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ElimError, ElimResult};

/// Sprite drawn for a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Bill,
    Coin,
}

/// A falling decorative sprite. Coordinates are the sprite centre in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
    pub kind: ParticleKind,
}

/// Tuning of a particle-fall scene.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    /// Frames in the scene.
    pub frames: u32,
    /// Delay of every frame.
    pub delay_ms: u32,
    /// A particle spawns on every `spawn_every`-th frame, starting with the first.
    pub spawn_every: u32,
    /// Probability that a spawned particle is a coin rather than a bill.
    pub coin_probability: f64,
    /// Vertical advance per frame as a fraction of surface height.
    pub fall_speed: f64,
    /// Rotation added per frame, in degrees.
    pub rotation_step_deg: f64,
    /// Sprite size (larger side) as a fraction of `min(width, height)`.
    pub size_fraction: f64,
    /// Particles are culled once `y > height + margin_fraction * height`.
    pub margin_fraction: f64,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            frames: 30,
            delay_ms: 100,
            spawn_every: 3,
            coin_probability: 0.4,
            fall_speed: 0.05,
            rotation_step_deg: 12.0,
            size_fraction: 0.12,
            margin_fraction: 0.1,
        }
    }
}

impl ParticleParams {
    pub fn validate(&self) -> ElimResult<()> {
        if self.frames == 0 {
            return Err(ElimError::validation(
                "particle-fall scene needs at least one frame",
            ));
        }
        if self.spawn_every == 0 {
            return Err(ElimError::validation("particle spawn_every must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.coin_probability) {
            return Err(ElimError::validation(
                "particle coin_probability must be within 0..=1",
            ));
        }
        for (name, v) in [
            ("fall_speed", self.fall_speed),
            ("size_fraction", self.size_fraction),
            ("margin_fraction", self.margin_fraction),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ElimError::validation(format!(
                    "particle {name} must be finite and >= 0"
                )));
            }
        }
        if !self.rotation_step_deg.is_finite() {
            return Err(ElimError::validation(
                "particle rotation_step_deg must be finite",
            ));
        }
        Ok(())
    }
}

/// What one [`ParticleField::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub spawned: bool,
    pub culled: usize,
}

/// Live particles of one particle-fall scene.
#[derive(Debug)]
pub struct ParticleField {
    params: ParticleParams,
    canvas: Canvas,
    particles: Vec<Particle>,
    frame: u32,
}

impl ParticleField {
    pub fn new(params: ParticleParams, canvas: Canvas) -> Self {
        Self {
            params,
            canvas,
            particles: Vec::new(),
            frame: 0,
        }
    }

    /// Sprite size in pixels.
    pub fn size_px(&self) -> f64 {
        f64::from(self.canvas.min_side()) * self.params.size_fraction
    }

    /// `y` beyond which a particle is culled.
    pub fn cull_line(&self) -> f64 {
        let h = f64::from(self.canvas.height);
        h + h * self.params.margin_fraction
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance one frame: spawn on schedule, integrate motion, cull below the margin.
    ///
    /// After this returns, every live particle is drawable; culled ones are gone for good.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StepReport {
        let mut report = StepReport::default();

        if self.frame % self.params.spawn_every == 0 {
            let kind = if rng.random_bool(self.params.coin_probability) {
                ParticleKind::Coin
            } else {
                ParticleKind::Bill
            };
            self.particles.push(Particle {
                x: rng.random_range(0.0..f64::from(self.canvas.width)),
                y: -self.size_px() / 2.0,
                rotation_deg: rng.random_range(0.0..360.0),
                kind,
            });
            report.spawned = true;
        }

        let dy = self.params.fall_speed * f64::from(self.canvas.height);
        for p in &mut self.particles {
            p.y += dy;
            p.rotation_deg = (p.rotation_deg + self.params.rotation_step_deg).rem_euclid(360.0);
        }

        let limit = self.cull_line();
        let before = self.particles.len();
        self.particles.retain(|p| p.y <= limit);
        report.culled = before - self.particles.len();

        self.frame += 1;
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/particles.rs"]
mod tests;
