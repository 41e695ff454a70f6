use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("shape mismatch in {stage}: {detail}")]
    ShapeMismatch { stage: &'static str, detail: String },
    #[error("invalid parameter in {stage}: {detail}")]
    InvalidParameter { stage: &'static str, detail: String },
    #[error("failed to load '{}': {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Relabels an operator error with the pipeline stage that raised it.
    pub fn in_stage(self, label: &'static str) -> Error {
        match self {
            Error::ShapeMismatch { detail, .. } => Error::ShapeMismatch { stage: label, detail },
            Error::InvalidParameter { detail, .. } => Error::InvalidParameter { stage: label, detail },
            other => other,
        }
    }
}

pub fn shape(stage: &'static str, detail: impl Into<String>) -> Error {
    Error::ShapeMismatch { stage, detail: detail.into() }
}

pub fn invalid(stage: &'static str, detail: impl Into<String>) -> Error {
    Error::InvalidParameter { stage, detail: detail.into() }
}

pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Error {
    Error::Load { path: path.into(), reason: reason.into() }
}
