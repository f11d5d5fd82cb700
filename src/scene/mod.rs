//! Scene descriptors, built-in presets and particle physics.

pub mod model;
pub mod particles;
pub mod presets;
