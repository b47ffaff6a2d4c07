//! Error types for console backends.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("The {backend} backend is not supported on this platform")]
    Unsupported { backend: &'static str },

    #[error("Output is not attached to a console")]
    NotAConsole,

    #[error("Origin ({x}, {y}) is outside the console coordinate range")]
    InvalidOrigin { x: i32, y: i32 },

    #[error("Console I/O error: {0}")]
    Io(#[from] io::Error),
}
