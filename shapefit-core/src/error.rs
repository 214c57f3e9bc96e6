//! Error types for shapefit

use thiserror::Error;

/// Main error type for shapefit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("ill-posed input: {0}")]
    IllPosed(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("fit did not converge: {0}")]
    NonConvergence(String),
}

/// Result type alias for shapefit operations
pub type Result<T> = std::result::Result<T, Error>;
