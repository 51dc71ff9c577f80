//! Reaction control surface
//!
//! The "now playing" message: an embed listing the playlist, seeded with five
//! fixed transport reactions. The emoji↔signal mapping lives here so the
//! controller never sees a reaction.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::{Message, ReactionType};
use serenity::model::id::{ChannelId, MessageId};
use tracing::warn;

use jukebot_core::{ControlSignal, ControlSurface, Playlist};

use crate::error::Result;

/// Transport reactions in the order they are seeded onto the message
pub const CONTROL_EMOJI: [(&str, ControlSignal); 5] = [
    ("⏯", ControlSignal::TogglePause),
    ("⏹", ControlSignal::Stop),
    ("⏮", ControlSignal::Previous),
    ("⏭", ControlSignal::Next),
    ("🔀", ControlSignal::Shuffle),
];

/// Map a unicode reaction to its control signal
pub fn signal_for_emoji(emoji: &str) -> Option<ControlSignal> {
    CONTROL_EMOJI
        .iter()
        .find(|(candidate, _)| *candidate == emoji)
        .map(|(_, signal)| *signal)
}

/// Post the now-playing embed and seed it with the transport reactions
pub async fn post(http: &Arc<Http>, channel: ChannelId, playlist: &Playlist) -> Result<Message> {
    let mut embed = CreateEmbed::new()
        .title(format!("Playlist: {}", playlist.name()))
        .color(0x00ff00);
    for track in playlist.tracks() {
        let origin = track
            .origin_title()
            .filter(|origin| *origin != track.title())
            .unwrap_or("\u{2014}");
        embed = embed.field(track.title(), origin, false);
    }

    let message = channel
        .send_message(http, CreateMessage::new().embed(embed))
        .await?;
    for (emoji, _) in CONTROL_EMOJI {
        message
            .react(http, ReactionType::Unicode(emoji.to_string()))
            .await?;
    }
    Ok(message)
}

/// Live now-playing message, deleted when the controller terminates
pub struct MessageSurface {
    http: Arc<Http>,
    channel: ChannelId,
    message: MessageId,
}

impl MessageSurface {
    pub fn new(http: Arc<Http>, channel: ChannelId, message: MessageId) -> Self {
        Self {
            http,
            channel,
            message,
        }
    }
}

#[async_trait]
impl ControlSurface for MessageSurface {
    async fn release(&self) {
        if let Err(e) = self
            .http
            .delete_message(self.channel, self.message, None)
            .await
        {
            warn!("failed to delete now-playing message: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_control_emoji_decodes_to_its_signal() {
        assert_eq!(signal_for_emoji("⏯"), Some(ControlSignal::TogglePause));
        assert_eq!(signal_for_emoji("⏹"), Some(ControlSignal::Stop));
        assert_eq!(signal_for_emoji("⏮"), Some(ControlSignal::Previous));
        assert_eq!(signal_for_emoji("⏭"), Some(ControlSignal::Next));
        assert_eq!(signal_for_emoji("🔀"), Some(ControlSignal::Shuffle));
    }

    #[test]
    fn unrelated_emoji_decodes_to_nothing() {
        assert_eq!(signal_for_emoji("👍"), None);
        assert_eq!(signal_for_emoji(""), None);
    }
}
