// src/error.rs
// Error type shared by every stage of a clip: configuration, rendering and encoding.

use plotters::drawing::DrawingAreaErrorKind;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("video encoder `{program}` is not available")]
    EncoderUnavailable { program: String },

    #[error("video encoder `{program}` exited with {status}")]
    EncoderFailed { program: String, status: ExitStatus },

    #[error("render error: {0}")]
    Render(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed parameter file: {0}")]
    Json(#[from] serde_json::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for ClipError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ClipError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClipError>;
