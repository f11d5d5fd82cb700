/// Convenience result type used across elimgif.
pub type ElimResult<T> = Result<T, ElimError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum ElimError {
    /// A selected file is not a recognised image. Recovered per file; never aborts a batch.
    #[error("invalid file type: '{name}' ({media_type}) is not an image")]
    InvalidFileType {
        /// File name as supplied by the user.
        name: String,
        /// Sniffed or declared media type.
        media_type: String,
    },

    /// An accepted file could not be decoded into a raster.
    #[error("decode error: {0}")]
    Decode(String),

    /// The drawing surface could not be acquired.
    #[error("canvas unavailable: {0}")]
    CanvasUnavailable(String),

    /// The encoder reported a failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Native sharing is not available in this environment.
    #[error("sharing is not supported in this environment")]
    SharingUnsupported,

    /// Invalid user-provided configuration or API misuse.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ElimError {
    /// Build an [`ElimError::InvalidFileType`] value.
    pub fn invalid_file_type(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self::InvalidFileType {
            name: name.into(),
            media_type: media_type.into(),
        }
    }

    /// Build an [`ElimError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`ElimError::CanvasUnavailable`] value.
    pub fn canvas(msg: impl Into<String>) -> Self {
        Self::CanvasUnavailable(msg.into())
    }

    /// Build an [`ElimError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build an [`ElimError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether this error ends the current generation run.
    ///
    /// Rejected files and missing share support are notices; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InvalidFileType { .. } | Self::SharingUnsupported
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
