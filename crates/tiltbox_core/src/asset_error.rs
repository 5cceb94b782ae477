//! Asset error types
//!
//! Errors from loading and decoding texture resources.

use std::io;

/// Error type for asset operations
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// IO error other than a missing file (permission denied, etc.)
    #[error("Asset IO error: {0}")]
    Io(#[from] io::Error),
    /// The file exists but is not a decodable image
    #[error("Asset decode error: {0}")]
    Decode(String),
    /// No resource with this name
    #[error("Asset not found: {0}")]
    MissingResource(String),
}

impl AssetError {
    /// True when the resource simply does not exist
    pub fn is_missing(&self) -> bool {
        matches!(self, AssetError::MissingResource(_))
    }
}

impl From<image::ImageError> for AssetError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io_err) => AssetError::Io(io_err),
            other => AssetError::Decode(other.to_string()),
        }
    }
}
