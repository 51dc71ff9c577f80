//! Discord gateway adapter
//!
//! Bridges serenity events onto the core: prefixed chat commands dispatch to
//! their handlers, and reactions on the active control message become
//! `ControlSignal`s routed through `BotState`.

pub mod commands;
pub mod surface;
pub mod voice;

use std::sync::Arc;

use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::gateway::ActivityData;
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::gateway::Ready;
use tracing::{debug, error, info};

use crate::state::BotState;

pub struct Handler {
    pub state: Arc<BotState>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);
        ctx.set_activity(Some(ActivityData::listening("the soundboard")));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(rest) = msg.content.strip_prefix(&self.state.config.prefix) else {
            return;
        };
        let command = rest
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();
        debug!(
            "command '{}' from {} in {}",
            command, msg.author.name, msg.channel_id
        );

        let result = match command.as_str() {
            "join" => commands::join(&self.state, &ctx, &msg).await,
            "leave" => commands::leave(&self.state, &ctx, &msg).await,
            "playlist" => commands::playlist(&self.state, &ctx, &msg).await,
            "download" => commands::download(&self.state, &ctx, &msg).await,
            "someone" => commands::someone(&ctx, &msg).await,
            // Unrecognized prefixed text is ignored
            _ => Ok(()),
        };

        if let Err(e) = result {
            error!("command '{}' failed: {}", command, e);
        }
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(user) = reaction.user_id else {
            return;
        };
        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };
        let Some(signal) = surface::signal_for_emoji(emoji) else {
            return;
        };
        self.state
            .route_signal(user, reaction.message_id, signal)
            .await;
    }
}
