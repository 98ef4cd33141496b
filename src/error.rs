//! Error types for the animation core.

use thiserror::Error;

/// Result type for animation operations.
pub type Result<T> = std::result::Result<T, AnimationError>;

/// Errors that can occur while driving an animation.
#[derive(Error, Debug)]
pub enum AnimationError {
    /// The tick interval was zero.
    #[error("animation interval must be greater than zero")]
    InvalidInterval,

    /// A wait was ended by an explicit teardown.
    ///
    /// This is the normal shutdown path of the worker threads and is never
    /// returned from the public controller API.
    #[error("wait cancelled by teardown")]
    Cancelled,

    /// The OS refused to create a worker thread.
    #[error("failed to spawn animation thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl AnimationError {
    /// Whether this error is the ordinary result of a teardown.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
