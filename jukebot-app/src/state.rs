//! Shared bot state
//!
//! `BotState` is the explicit owner of everything the process keeps alive:
//! the singleton voice session, the track resolver, and at most one running
//! playback controller. It is constructed once in `main` and passed to the
//! Discord handler and the HTTP surface.

use std::sync::Arc;

use serenity::model::id::{MessageId, UserId};
use tokio::sync::Mutex;
use tracing::{debug, info};

use jukebot_core::{ControlSignal, ControllerHandle, VoiceSession};

use crate::config::Config;
use crate::discord::voice::SongbirdConnector;
use crate::resolver::TrackResolver;

/// The process-wide voice session type
pub type Session = VoiceSession<SongbirdConnector>;

/// The reaction-controlled playback session currently on display
struct ActiveControl {
    requester: UserId,
    message: MessageId,
    controller: ControllerHandle,
}

pub struct BotState {
    pub config: Config,
    pub session: Arc<Session>,
    pub resolver: TrackResolver,
    pub http: reqwest::Client,
    active: Mutex<Option<ActiveControl>>,
}

impl BotState {
    pub fn new(
        config: Config,
        session: Arc<Session>,
        resolver: TrackResolver,
        http: reqwest::Client,
    ) -> Self {
        Self {
            config,
            session,
            resolver,
            http,
            active: Mutex::new(None),
        }
    }

    /// Install a freshly spawned controller as the active one.
    ///
    /// Any previous controller is cancelled and awaited first, so a single
    /// controller drives the voice session at a time.
    pub async fn activate(
        &self,
        requester: UserId,
        message: MessageId,
        controller: ControllerHandle,
    ) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            info!("replacing previous playback controller");
            previous.controller.cancel();
            previous.controller.wait().await;
        }
        *active = Some(ActiveControl {
            requester,
            message,
            controller,
        });
    }

    /// Forward a decoded reaction to the active controller.
    ///
    /// Only reactions from the requesting user on the active control message
    /// become signals; everything else is dropped, not queued.
    pub async fn route_signal(&self, user: UserId, message: MessageId, signal: ControlSignal) {
        let mut active = self.active.lock().await;
        let Some(control) = active.as_ref() else {
            return;
        };
        if control.requester != user || control.message != message {
            debug!("ignoring reaction from {} on message {}", user, message);
            return;
        }
        if !control.controller.signal(signal).await {
            // Controller already terminated; forget the stale entry
            debug!("dropping signal for terminated controller");
            active.take();
        }
    }

    /// Cancel and await the active controller, if any
    pub async fn deactivate(&self) {
        if let Some(control) = self.active.lock().await.take() {
            info!("cancelling playback controller");
            control.controller.cancel();
            control.controller.wait().await;
        }
    }

    /// Orderly teardown: controller first, then the voice connection
    pub async fn shutdown(&self) {
        self.deactivate().await;
        self.session.disconnect().await;
    }
}
