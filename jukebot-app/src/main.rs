//! jukebot - Main entry point
//!
//! Wires the voice session, the Discord gateway, and the HTTP trigger
//! surface together and runs until Ctrl+C/SIGTERM.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use serenity::prelude::GatewayIntents;
use serenity::Client;
use songbird::Songbird;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebot::api;
use jukebot::config::{Args, Config};
use jukebot::discord::voice::SongbirdConnector;
use jukebot::discord::Handler;
use jukebot::resolver::TrackResolver;
use jukebot::state::BotState;
use jukebot_core::VoiceSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukebot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_args(args).context("Failed to load configuration")?;
    info!("Sounds directory: {}", config.sounds_dir.display());

    let http = reqwest::Client::new();
    let manager = Songbird::serenity();

    let session = Arc::new(VoiceSession::new(SongbirdConnector::new(
        Arc::clone(&manager),
        http.clone(),
    )));
    let resolver = TrackResolver::new(
        http.clone(),
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
    );
    let state = Arc::new(BotState::new(
        config,
        Arc::clone(&session),
        resolver,
        http,
    ));

    // HTTP trigger surface runs beside the gateway
    let api_ctx = api::AppContext {
        session: Arc::clone(&session),
        sounds_dir: state.config.sounds_dir.clone(),
    };
    let api_host = state.config.host.clone();
    let api_port = state.config.port;
    tokio::spawn(async move {
        if let Err(e) = api::run(api_ctx, &api_host, api_port).await {
            error!("HTTP trigger server error: {}", e);
        }
    });

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&state.config.discord_token, intents)
        .event_handler(Handler {
            state: Arc::clone(&state),
        })
        .voice_manager_arc(manager)
        .await
        .context("Failed to build Discord client")?;

    info!("Starting jukebot");
    tokio::select! {
        result = client.start() => result.context("Discord client error")?,
        _ = shutdown_signal() => {}
    }

    state.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
