use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ElimError, ElimResult};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A user-selected file before decoding.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Display name (usually the file name).
    pub name: String,
    /// Media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw encoded bytes.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Wrap in-memory bytes with a declared media type.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Wrap in-memory bytes and sniff the media type from content, then from the name.
    pub fn sniffed(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let media_type = sniff_media_type(&name, &bytes);
        Self {
            name,
            media_type,
            bytes,
        }
    }

    /// Read a file from disk and sniff its media type.
    pub fn from_path(path: impl AsRef<Path>) -> ElimResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read input file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::sniffed(name, bytes))
    }

    /// `image/*` prefix check.
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Best-effort media type: magic bytes first, file extension second.
pub fn sniff_media_type(name: &str, bytes: &[u8]) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    if let Ok(format) = image::ImageFormat::from_path(name) {
        return format.to_mime_type().to_string();
    }
    match Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("txt" | "md" | "csv" | "log") => "text/plain".to_string(),
        Some("json") => "application/json".to_string(),
        Some("pdf") => "application/pdf".to_string(),
        _ => FALLBACK_MEDIA_TYPE.to_string(),
    }
}

/// Result of validating one upload batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Files that passed the media type check, in input order.
    pub accepted: Vec<SourceFile>,
    /// One [`ElimError::InvalidFileType`] notice per rejected file, in input order.
    pub rejected: Vec<ElimError>,
}

/// Split a batch into image files and per-file rejection notices.
///
/// Rejections never abort the batch; valid files in the same batch are always kept.
pub fn accept_batch(files: impl IntoIterator<Item = SourceFile>) -> BatchOutcome {
    let mut out = BatchOutcome::default();
    for file in files {
        if file.is_image() {
            out.accepted.push(file);
        } else {
            tracing::warn!(name = %file.name, media_type = %file.media_type, "rejected non-image file");
            out.rejected
                .push(ElimError::invalid_file_type(file.name, file.media_type));
        }
    }
    tracing::debug!(
        accepted = out.accepted.len(),
        rejected = out.rejected.len(),
        "upload batch validated"
    );
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/intake.rs"]
mod tests;
