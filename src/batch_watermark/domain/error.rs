use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Color parsing failed: {0}")]
    ColorParseError(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
