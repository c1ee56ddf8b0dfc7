//! Error types for flag color extraction and mixing.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ColorError>;

#[derive(Error, Debug)]
pub enum ColorError {
    /// A caller-supplied argument is out of range or malformed.
    #[error("Invalid parameter: {parameter} ({reason})")]
    InvalidParameter { parameter: String, reason: String },

    /// Image bytes handed to a collaborator entry point could not be decoded.
    #[error("Unable to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// A palette document could not be read or written.
    #[error("Palette JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ColorError {
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// True for out-of-range or malformed arguments.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, ColorError::InvalidParameter { .. })
    }
}
