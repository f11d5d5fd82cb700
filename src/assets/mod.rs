//! Upload intake, image decoding and sprite assets.

pub mod decode;
pub mod intake;
pub mod loader;
pub mod source;
pub mod sprites;
