//! Songbird-backed voice connection
//!
//! Implements the core `Connector`/`Connection` seam over a songbird `Call`.
//! The "is playing" state is always derived from the live track handle, never
//! stored on its own.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{File, Input, YoutubeDl};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Songbird};
use tokio::sync::Mutex;
use tracing::debug;

use jukebot_core::{Connection, Connector, Error, Result, SourceRef};

/// Where to connect: one guild's voice channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceTarget {
    pub guild: GuildId,
    pub channel: ChannelId,
}

/// Establishes [`CallConnection`]s through the songbird voice manager
pub struct SongbirdConnector {
    manager: Arc<Songbird>,
    http: reqwest::Client,
}

impl SongbirdConnector {
    pub fn new(manager: Arc<Songbird>, http: reqwest::Client) -> Self {
        Self { manager, http }
    }
}

#[async_trait]
impl Connector for SongbirdConnector {
    type Target = VoiceTarget;
    type Conn = CallConnection;

    async fn connect(&self, target: &VoiceTarget) -> Result<CallConnection> {
        let call = self
            .manager
            .join(target.guild, target.channel)
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;

        Ok(CallConnection {
            call,
            http: self.http.clone(),
            track: None,
        })
    }
}

/// A joined voice call plus the handle of the stream it is producing
pub struct CallConnection {
    call: Arc<Mutex<Call>>,
    http: reqwest::Client,
    track: Option<TrackHandle>,
}

#[async_trait]
impl Connection for CallConnection {
    async fn play(&mut self, source: &SourceRef) -> Result<()> {
        let input: Input = match source {
            SourceRef::File(path) => File::new(path.clone()).into(),
            // yt-dlp resolves the stream at play time, so stored URLs never
            // go stale
            SourceRef::Url(url) => YoutubeDl::new(self.http.clone(), url.clone()).into(),
        };

        let mut call = self.call.lock().await;
        self.track = Some(call.play_input(input));
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(track) = self.track.take() {
            track.stop().map_err(|e| Error::Playback(e.to_string()))?;
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        if let Some(track) = &self.track {
            track.pause().map_err(|e| Error::Playback(e.to_string()))?;
        }
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        if let Some(track) = &self.track {
            track.play().map_err(|e| Error::Playback(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_playing(&mut self) -> bool {
        let info = match &self.track {
            Some(track) => track.get_info().await,
            None => return false,
        };
        match info {
            Ok(state) => state.playing == PlayMode::Play,
            Err(_) => {
                // The driver dropped the track (ended or errored)
                self.track = None;
                false
            }
        }
    }

    async fn disconnect(&mut self) {
        self.track = None;
        let mut call = self.call.lock().await;
        call.stop();
        if let Err(e) = call.leave().await {
            debug!("voice leave failed: {}", e);
        }
    }
}
