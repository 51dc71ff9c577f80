//! Chat command handlers

use std::sync::Arc;

use rand::seq::IteratorRandom;
use serenity::client::Context;
use serenity::model::channel::Message;
use serenity::prelude::Mentionable;
use tracing::{info, warn};

use jukebot_core::controller::DEFAULT_DISPATCH_PAUSE;
use jukebot_core::{PlaybackController, Playlist};

use crate::error::Result;
use crate::sounds;
use crate::state::BotState;

use super::surface::{self, MessageSurface};
use super::voice::VoiceTarget;

/// Voice channel the message author currently sits in, if any.
///
/// Plain function (not async): the cache guard must not live across an await.
fn author_voice_target(ctx: &Context, msg: &Message) -> Option<VoiceTarget> {
    let guild = msg.guild(&ctx.cache)?;
    let channel = guild
        .voice_states
        .get(&msg.author.id)
        .and_then(|state| state.channel_id)?;
    Some(VoiceTarget {
        guild: guild.id,
        channel,
    })
}

/// `join`: connect the voice session to the author's channel
pub async fn join(state: &BotState, ctx: &Context, msg: &Message) -> Result<()> {
    let target = author_voice_target(ctx, msg);
    if target.is_none() {
        warn!("{} requested join without being in a voice channel", msg.author.name);
        msg.channel_id
            .say(&ctx.http, "You are not connected to a voice channel")
            .await?;
        return Ok(());
    }

    state.session.connect(target).await?;
    Ok(())
}

/// `leave`: tear down the voice connection (and any controller using it)
pub async fn leave(state: &BotState, ctx: &Context, msg: &Message) -> Result<()> {
    if author_voice_target(ctx, msg).is_none() {
        warn!("leave requested outside a voice channel");
        msg.channel_id
            .say(&ctx.http, "The bot is not connected to a voice channel")
            .await?;
        return Ok(());
    }

    // No controller may outlive the connection it drives
    state.deactivate().await;
    state.session.disconnect().await;
    Ok(())
}

/// `playlist <id>`: resolve a remote playlist and start a reaction-driven
/// playback session over it
pub async fn playlist(state: &BotState, ctx: &Context, msg: &Message) -> Result<()> {
    let id = msg.content.split_whitespace().nth(1).unwrap_or("");
    if id.len() < 2 {
        warn!("no playlist id provided");
        msg.channel_id
            .say(&ctx.http, "No playlist id provided")
            .await?;
        return Ok(());
    }

    let progress = msg
        .channel_id
        .say(
            &ctx.http,
            "Matching the playlist songs on YouTube. This might take a while...",
        )
        .await?;
    let resolved = state.resolver.resolve(id).await;
    progress.delete(&ctx.http).await?;

    let resolved = match resolved {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("playlist resolution failed: {}", e);
            msg.channel_id
                .say(&ctx.http, format!("Could not resolve playlist `{id}`"))
                .await?;
            return Ok(());
        }
    };

    let playlist = match Playlist::new(resolved.name, resolved.tracks) {
        Ok(playlist) => playlist,
        Err(e) => {
            warn!("refusing to start playback: {}", e);
            msg.channel_id
                .say(&ctx.http, "None of the playlist tracks could be resolved")
                .await?;
            return Ok(());
        }
    };

    // One controller at a time drives the voice session
    state.deactivate().await;

    let message = surface::post(&ctx.http, msg.channel_id, &playlist).await?;
    let handle = PlaybackController::spawn(
        playlist,
        Arc::clone(&state.session),
        Box::new(MessageSurface::new(
            Arc::clone(&ctx.http),
            msg.channel_id,
            message.id,
        )),
        DEFAULT_DISPATCH_PAUSE,
    );
    state.activate(msg.author.id, message.id, handle).await;

    info!("playback session started for {}", msg.author.name);
    Ok(())
}

/// `download <url> <name>`: fetch a soundbit into the clip library
pub async fn download(state: &BotState, ctx: &Context, msg: &Message) -> Result<()> {
    let mut parts = msg.content.split_whitespace().skip(1);
    let (Some(url), Some(name)) = (parts.next(), parts.next()) else {
        msg.channel_id
            .say(&ctx.http, "Usage: download <url> <name>")
            .await?;
        return Ok(());
    };

    sounds::download(&state.http, url, &state.config.sounds_dir, name).await?;
    msg.channel_id
        .say(&ctx.http, format!("Stored soundbit `{name}`"))
        .await?;
    Ok(())
}

/// `someone`: mention a random guild member
pub async fn someone(ctx: &Context, msg: &Message) -> Result<()> {
    let mention = {
        let Some(guild) = msg.guild(&ctx.cache) else {
            return Ok(());
        };
        let mut rng = rand::thread_rng();
        guild
            .members
            .values()
            .choose(&mut rng)
            .map(|member| member.mention().to_string())
    };

    if let Some(mention) = mention {
        msg.channel_id
            .say(&ctx.http, format!("The wheel spins... {mention}"))
            .await?;
    }
    Ok(())
}
