//! Error types for the jukebot application crate

use thiserror::Error;

/// Convenience Result type using the application Error
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level errors wrapping the core and the glue layers
#[derive(Error, Debug)]
pub enum Error {
    /// Playback session control errors
    #[error(transparent)]
    Core(#[from] jukebot_core::Error),

    /// Discord API or gateway errors
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Outbound HTTP request errors
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote track resolution errors
    #[error("Track resolution failed: {0}")]
    Resolve(String),

    /// Clip name that could escape the sounds directory
    #[error("Invalid clip name: {0}")]
    InvalidClipName(String),
}
