//! Playback controller: the event loop binding a playlist to the voice session
//!
//! The controller consumes [`ControlSignal`]s from an mpsc channel; it never
//! sees a chat reaction or an emoji. An adapter listening to the actual chat
//! framework decides which events become signals and pushes them through the
//! [`ControllerHandle`].
//!
//! Lifecycle: spawning the loop task makes the controller active; it
//! terminates on an explicit [`ControlSignal::Stop`], on cancellation via
//! [`ControllerHandle::cancel`], or when every signal sender is dropped. All
//! three paths run the same cleanup (halt playback, release the now-playing
//! surface, drop the playlist). A terminated controller is never restarted;
//! a new session spawns a new one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::playlist::Playlist;
use crate::session::{Connector, VoiceSession};

/// Transport control vocabulary driving the controller loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Shuffle,
    Previous,
    Next,
    TogglePause,
    Stop,
}

/// The displayed "now playing" control surface.
///
/// Released exactly once, when the controller terminates.
#[async_trait]
pub trait ControlSurface: Send + Sync + 'static {
    async fn release(&self);
}

/// Signals come from human reactions, so a small buffer is plenty
const SIGNAL_BUFFER: usize = 16;

/// Pause between a dispatched signal and the next wait. Rate-limits how fast
/// rapid duplicate signals can re-trigger transport changes.
pub const DEFAULT_DISPATCH_PAUSE: Duration = Duration::from_secs(1);

/// Event loop owning one [`Playlist`] and driving one [`VoiceSession`]
pub struct PlaybackController<C: Connector> {
    playlist: Playlist,
    session: Arc<VoiceSession<C>>,
    surface: Box<dyn ControlSurface>,
    signals: mpsc::Receiver<ControlSignal>,
    cancel: Arc<Notify>,
    dispatch_pause: Duration,
}

/// Handle to a running controller: pushes signals, cancels, observes exit.
///
/// Dropping the handle closes the signal channel, which the loop treats the
/// same as cancellation.
pub struct ControllerHandle {
    signals: mpsc::Sender<ControlSignal>,
    cancel: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Push a signal to the loop. Returns `false` once the controller has
    /// terminated; the signal then has no effect.
    pub async fn signal(&self, signal: ControlSignal) -> bool {
        self.signals.send(signal).await.is_ok()
    }

    /// Ask the loop to terminate. Observed at its next suspension point;
    /// the loop performs the same cleanup as an explicit stop.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop task to exit
    pub async fn wait(self) {
        let _ = self.task.await;
    }
}

impl<C: Connector> PlaybackController<C> {
    /// Spawn the control loop over `playlist` and return its handle.
    ///
    /// The caller is responsible for the single-active-controller invariant:
    /// any previously spawned controller must be cancelled first, so the
    /// session is never driven by two loops at once.
    pub fn spawn(
        playlist: Playlist,
        session: Arc<VoiceSession<C>>,
        surface: Box<dyn ControlSurface>,
        dispatch_pause: Duration,
    ) -> ControllerHandle {
        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);
        let cancel = Arc::new(Notify::new());

        let controller = Self {
            playlist,
            session,
            surface,
            signals: rx,
            cancel: Arc::clone(&cancel),
            dispatch_pause,
        };
        let task = tokio::spawn(controller.run());

        ControllerHandle {
            signals: tx,
            cancel,
            task,
        }
    }

    async fn run(mut self) {
        info!("control loop started for playlist '{}'", self.playlist.name());

        loop {
            let signal = tokio::select! {
                _ = self.cancel.notified() => {
                    warn!("control loop cancelled");
                    self.shutdown().await;
                    return;
                }
                received = self.signals.recv() => match received {
                    Some(signal) => signal,
                    None => {
                        warn!("all signal producers gone, ending playback session");
                        self.shutdown().await;
                        return;
                    }
                },
            };

            if signal == ControlSignal::Stop {
                info!("stop requested, ending playback session");
                self.shutdown().await;
                return;
            }

            if let Err(e) = self.dispatch(signal).await {
                // Faults while handling a signal never terminate the session
                error!("failed to handle {:?}: {}", signal, e);
            }

            tokio::time::sleep(self.dispatch_pause).await;
        }
    }

    async fn dispatch(&mut self, signal: ControlSignal) -> Result<()> {
        match signal {
            ControlSignal::Shuffle => {
                let track = self.playlist.pick_random(&mut rand::thread_rng());
                info!("shuffle -> '{}'", track.title());
                self.session.play(track.source()).await
            }
            ControlSignal::Previous => {
                let track = self.playlist.previous();
                info!("previous -> '{}'", track.title());
                self.session.play(track.source()).await
            }
            ControlSignal::Next => {
                let track = self.playlist.next();
                info!("next -> '{}'", track.title());
                self.session.play(track.source()).await
            }
            ControlSignal::TogglePause => self.session.toggle_pause().await,
            // Terminal; handled by the loop before dispatch
            ControlSignal::Stop => Ok(()),
        }
    }

    /// Cleanup shared by every termination path: halt playback, release the
    /// now-playing surface. The playlist dies with the controller.
    async fn shutdown(self) {
        if let Err(e) = self.session.stop().await {
            warn!("failed to halt playback during shutdown: {}", e);
        }
        self.surface.release().await;
    }
}
