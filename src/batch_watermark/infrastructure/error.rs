use thiserror::Error;
use crate::domain::error::DomainError;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Failed to load overlay asset {path:?}: {reason}")]
    AssetLoadError { path: PathBuf, reason: String },

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("File storage error: {0}")]
    FileStorageError(String),

    #[error("Underlying image library error: {0}")]
    ImageLibError(#[from] image::ImageError),

    #[error("Underlying I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // Color and geometry problems surface from the domain layer while rendering.
    #[error("Domain error: {0}")]
    DomainErrorWrapper(#[from] DomainError),
}
