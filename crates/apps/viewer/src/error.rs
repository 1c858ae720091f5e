use compute::ComputeError;
use formats::{FormatError, SourceError};
use scene::SceneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no dataset loaded")]
    NotLoaded,
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),
    #[error("decode failed: {0}")]
    Format(#[from] FormatError),
    #[error("encoding failed: {0}")]
    Compute(#[from] ComputeError),
    #[error("buffer update rejected: {0}")]
    Scene(#[from] SceneError),
}
