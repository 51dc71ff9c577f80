//! Error types for jukebot-core

use thiserror::Error;

/// Convenience Result type using the core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for playback session control
#[derive(Error, Debug)]
pub enum Error {
    /// Playlist construction rejected an empty track list
    #[error("playlist contains no tracks")]
    EmptyPlaylist,

    /// Connect attempt with no voice target
    #[error("no voice target specified")]
    InvalidTarget,

    /// Voice connection establishment failed
    #[error("voice connection failed: {0}")]
    Connect(String),

    /// Audio backend fault while starting or controlling a stream
    #[error("playback failed: {0}")]
    Playback(String),
}
