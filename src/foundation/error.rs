/// Convenience result type used across sawcut.
pub type SawcutResult<T> = Result<T, SawcutError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum SawcutError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A static asset could not be read or decoded.
    #[error("asset load error: '{source_id}': {reason}")]
    AssetLoad {
        /// Path or identifier of the asset as it was requested.
        source_id: String,
        /// Underlying failure description.
        reason: String,
    },

    /// Invalid geometry inside a transform or canvas operation.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Composing a single frame failed; the whole sequence is discarded.
    #[error("composition error at frame {frame}: {message}")]
    Composition {
        /// 0-based index of the failing frame.
        frame: u64,
        /// Description of the underlying failure.
        message: String,
    },

    /// The encoder adapter failed after every frame was produced.
    #[error("video encode error: {0}")]
    VideoEncode(String),

    /// The run was cancelled cooperatively before `frame` was composed.
    #[error("render cancelled before frame {frame}")]
    Cancelled {
        /// First frame that was not composed.
        frame: u64,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SawcutError {
    /// Build a [`SawcutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SawcutError::AssetLoad`] value.
    pub fn asset_load(source_id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetLoad {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`SawcutError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`SawcutError::VideoEncode`] value.
    pub fn video_encode(msg: impl Into<String>) -> Self {
        Self::VideoEncode(msg.into())
    }

    /// Attach a frame index, turning the error into a [`SawcutError::Composition`].
    ///
    /// Errors that already carry a frame (composition, cancellation) pass through unchanged.
    pub fn at_frame(self, frame: u64) -> Self {
        match self {
            Self::Composition { .. } | Self::Cancelled { .. } => self,
            other => Self::Composition {
                frame,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
