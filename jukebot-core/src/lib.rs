//! # jukebot-core
//!
//! Playback session control for a voice-channel music/soundboard bot.
//!
//! **Purpose:** Model a named playlist with a circular cursor, own the single
//! live voice connection behind uniformly guarded operations, and run the
//! event loop that maps transport control signals onto that connection.
//!
//! **Architecture:** The chat framework, the HTTP surface, and the audio
//! backend all live outside this crate. They plug in through the
//! [`session::Connector`]/[`session::Connection`] traits, the
//! [`controller::ControlSurface`] trait, and the [`controller::ControlSignal`]
//! channel fed through a [`controller::ControllerHandle`].

pub mod controller;
pub mod error;
pub mod playlist;
pub mod session;

pub use controller::{ControlSignal, ControlSurface, ControllerHandle, PlaybackController};
pub use error::{Error, Result};
pub use playlist::{Playlist, SourceRef, Track};
pub use session::{Connection, Connector, VoiceSession};
