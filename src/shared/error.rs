use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("failed to open video {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("failed to decode frame {index}: {reason}")]
    Decode { index: u64, reason: String },

    #[error("face detection failed: {0}")]
    Detection(String),

    #[error("face crop is empty after clipping")]
    EmptyCrop,

    #[error("failed to resize crop: {0}")]
    Resize(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

