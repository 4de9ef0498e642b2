/// Convenience result type used across meshmorph.
pub type MorphResult<T> = Result<T, MorphError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Per-triangle numeric edge cases (degenerate triangles, out-of-range mesh indices) are not
/// errors: they are absorbed by the rasterizer and reported through
/// [`RasterStats`](crate::RasterStats).
#[derive(thiserror::Error, Debug)]
pub enum MorphError {
    /// Fewer than 3 usable correspondence points; no mesh is built.
    #[error("insufficient points: at least 3 usable correspondence points are required, found {found}")]
    InsufficientPoints {
        /// Number of usable points that were available.
        found: usize,
    },

    /// Source and target point counts differ after filtering incomplete entries.
    #[error(
        "mismatched correspondence: {source_count} source points vs {target_count} target points"
    )]
    MismatchedCorrespondence {
        /// Number of usable source points.
        source_count: usize,
        /// Number of usable target points.
        target_count: usize,
    },

    /// A caller-supplied parameter is out of its domain (`n < 1`, `t` outside `[0, 1]`, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid images, canvases or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A render was cancelled at a frame boundary.
    #[error("render cancelled after {completed} of {total} frames")]
    Cancelled {
        /// Intermediate frames finished before cancellation was observed.
        completed: u32,
        /// Intermediate frames requested.
        total: u32,
    },

    /// Errors raised by sequence writers.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MorphError {
    /// Build a [`MorphError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`MorphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MorphError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
