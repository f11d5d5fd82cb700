//! CPU compositing onto a single reusable surface.

pub mod compositor;
pub mod frame;
pub mod overlay;
