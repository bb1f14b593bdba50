//! Error types for the `flipbook` crate.
//!
//! This module defines [`FlipbookError`], the unified error type returned by
//! every fallible operation in the crate. The first five variants are the
//! user-correctable conversion failures a front end reports verbatim; the rest
//! wrap failures from the decoding, image and document libraries.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `flipbook` operations.
///
/// Every public method that can fail returns `Result<T, FlipbookError>`.
/// Variants carry enough context (paths, offending values) to be shown to a
/// user as a single message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlipbookError {
    /// A required input (video path or output folder) was not supplied.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A conversion parameter is outside its allowed domain.
    ///
    /// Raised before any file is touched.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The video could not be opened, has no video stream, or reports an
    /// unusable frame rate.
    #[error("Cannot read video source {path}: {reason}")]
    SourceUnreadable {
        /// Path of the video that was requested.
        path: PathBuf,
        /// Underlying reason the source was rejected.
        reason: String,
    },

    /// The staging directory could not be created or written to.
    #[error("Staging directory {path} is not writable: {reason}")]
    StagingUnwritable {
        /// The staging directory.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },

    /// Layout was asked for a non-empty flipbook but no staged frames exist.
    #[error("No staged frames found in {0}")]
    NoFramesFound(PathBuf),

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The PDF document could not be assembled or written.
    #[error("Document error: {0}")]
    DocumentError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding or inspecting a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FlipbookError {
    fn from(error: FfmpegError) -> Self {
        FlipbookError::FfmpegError(error.to_string())
    }
}

impl From<lopdf::Error> for FlipbookError {
    fn from(error: lopdf::Error) -> Self {
        FlipbookError::DocumentError(error.to_string())
    }
}

impl FlipbookError {
    /// Returns `true` for failures caused by caller input rather than by the
    /// environment (missing inputs and out-of-domain parameters).
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            FlipbookError::MissingInput(_) | FlipbookError::InvalidParameter(_)
        )
    }
}
