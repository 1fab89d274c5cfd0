/// Result alias used across the crate.
pub type ClipgridResult<T> = Result<T, ClipgridError>;

/// Error categories surfaced by scheduling, clustering and rendering.
#[derive(thiserror::Error, Debug)]
pub enum ClipgridError {
    /// Malformed or out-of-range configuration, raised before scheduling begins.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Conflicting schedule, e.g. overlapping tweens for one (clip, property).
    #[error("scheduling error: {0}")]
    Scheduling(String),

    /// k-means could not produce a usable partition.
    #[error("clustering error: {0}")]
    Clustering(String),

    /// Warp kernel failure for a frame (dimension mismatch, worker pool failure).
    #[error("kernel error: {0}")]
    Kernel(String),

    /// Input data violates a documented contract (sample grid, mixer ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClipgridError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn scheduling(msg: impl Into<String>) -> Self {
        Self::Scheduling(msg.into())
    }

    pub fn clustering(msg: impl Into<String>) -> Self {
        Self::Clustering(msg.into())
    }

    pub fn kernel(msg: impl Into<String>) -> Self {
        Self::Kernel(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
