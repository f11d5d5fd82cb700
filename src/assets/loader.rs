use rayon::prelude::*;

use crate::assets::decode::decode_image;
use crate::assets::intake::SourceFile;
use crate::assets::source::SourceImage;
use crate::foundation::error::{ElimError, ElimResult};

/// Decode every file of a run, all or nothing.
///
/// Files are decoded in parallel; the call returns only after every decode has finished, with
/// images in input order. Any failure rejects the whole load.
#[tracing::instrument(skip(files), fields(count = files.len()))]
pub fn load_sources(files: &[SourceFile]) -> ElimResult<Vec<SourceImage>> {
    if files.is_empty() {
        return Err(ElimError::validation("no source images to load"));
    }

    let images = files
        .par_iter()
        .map(|f| {
            if !f.is_image() {
                return Err(ElimError::decode(format!(
                    "'{}' is not an image ({})",
                    f.name, f.media_type
                )));
            }
            decode_image(&f.bytes).map_err(|e| match e {
                ElimError::Decode(msg) => ElimError::decode(format!("'{}': {msg}", f.name)),
                other => other,
            })
        })
        .collect::<ElimResult<Vec<_>>>()?;

    tracing::debug!(count = images.len(), "sources decoded");
    Ok(images)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
