//! Custom error types for exradd.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the exradd library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to decode an input file.
    #[error("failed to decode image from {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },

    /// Failed to encode the output file.
    #[error("failed to encode image to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },

    /// Width, height or channel count differ between the two inputs.
    #[error(
        "files {} and {} do not match: {}x{} with {} channels vs {}x{} with {} channels",
        .query.display(),
        .reference.display(),
        .query_size.0,
        .query_size.1,
        .query_size.2,
        .reference_size.0,
        .reference_size.1,
        .reference_size.2
    )]
    IncompatibleDimensions {
        query: PathBuf,
        reference: PathBuf,
        /// `(width, height, channels)` of the query image.
        query_size: (usize, usize, usize),
        /// `(width, height, channels)` of the reference image.
        reference_size: (usize, usize, usize),
    },

    /// Channel names differ at some position.
    #[error(
        "files {} and {} have different color channels: channel {index} is {query_channel:?} vs {reference_channel:?}",
        .query.display(),
        .reference.display()
    )]
    IncompatibleChannels {
        query: PathBuf,
        reference: PathBuf,
        index: usize,
        query_channel: String,
        reference_channel: String,
    },

    /// An in-memory image violates the raster invariants.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl Error {
    /// Whether this error reports a structural mismatch between the inputs.
    #[must_use]
    pub const fn is_incompatible(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleDimensions { .. } | Self::IncompatibleChannels { .. }
        )
    }
}

/// Result type alias for exradd operations.
pub type Result<T> = std::result::Result<T, Error>;
