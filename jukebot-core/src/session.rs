//! Voice session: single point of truth for the live voice connection
//!
//! `VoiceSession` owns the (at most one) live connection and serializes every
//! mutation behind one async mutex, so the controller loop and the direct
//! clip-trigger path can both drive it safely. All operations on an absent
//! connection degrade to a logged no-op instead of faulting; that guard is
//! the component's central contract and every public operation funnels
//! through the same dispatch point.

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::playlist::SourceRef;

/// A live voice connection as seen by the session.
///
/// Implementations wrap the actual voice backend; the session only cares
/// about starting, halting, and pausing a single audio stream.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Start streaming `source`. Any previously started stream has already
    /// been stopped by the session before this is called.
    async fn play(&mut self, source: &SourceRef) -> Result<()>;

    /// Halt the current stream
    async fn stop(&mut self) -> Result<()>;

    /// Pause the current stream
    async fn pause(&mut self) -> Result<()>;

    /// Resume a paused stream
    async fn resume(&mut self) -> Result<()>;

    /// Whether audio is actively being produced (a paused stream is not)
    async fn is_playing(&mut self) -> bool;

    /// Tear the connection down
    async fn disconnect(&mut self);
}

/// Establishes [`Connection`]s to a voice target
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Identifies where to connect (e.g. a guild + channel pair)
    type Target: Send + Sync + PartialEq + Debug;
    type Conn: Connection;

    async fn connect(&self, target: &Self::Target) -> Result<Self::Conn>;
}

/// Owner of the single live voice connection.
///
/// One `VoiceSession` exists per running bot; it is created unconnected and
/// only `connect`/`disconnect` change whether a connection exists.
pub struct VoiceSession<C: Connector> {
    connector: C,
    conn: Mutex<Option<(C::Target, C::Conn)>>,
}

impl<C: Connector> VoiceSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            conn: Mutex::new(None),
        }
    }

    /// Single dispatch point for the guarded operations: yields the live
    /// connection, or logs and yields `None` when there is none.
    async fn guarded(&self, op: &'static str) -> Option<MappedMutexGuard<'_, C::Conn>> {
        let slot = self.conn.lock().await;
        match MutexGuard::try_map(slot, |conn| conn.as_mut().map(|(_, c)| c)) {
            Ok(conn) => Some(conn),
            Err(_) => {
                warn!("voice connection is not established, ignoring {}", op);
                None
            }
        }
    }

    /// Establish a connection to `target`.
    ///
    /// Fails with [`Error::InvalidTarget`] when no target is given, leaving
    /// any existing connection untouched. Connecting to the current target
    /// again is a no-op; a different target replaces the old handle (which
    /// is discarded, not explicitly disconnected).
    pub async fn connect(&self, target: Option<C::Target>) -> Result<()> {
        let target = target.ok_or(Error::InvalidTarget)?;

        let mut slot = self.conn.lock().await;
        if let Some((current, _)) = slot.as_ref() {
            if *current == target {
                debug!("already connected to {:?}", target);
                return Ok(());
            }
        }

        info!("connecting to {:?}", target);
        let conn = self.connector.connect(&target).await?;
        *slot = Some((target, conn));
        Ok(())
    }

    /// Tear down the connection. Safe no-op when there is none.
    pub async fn disconnect(&self) {
        let mut slot = self.conn.lock().await;
        match slot.take() {
            Some((target, mut conn)) => {
                info!("disconnecting from {:?}", target);
                conn.disconnect().await;
            }
            None => warn!("voice connection is not established, ignoring disconnect"),
        }
    }

    /// Play `source`, halting any stream already running first so playback
    /// is never overlapped. Guarded no-op when unconnected.
    pub async fn play(&self, source: &SourceRef) -> Result<()> {
        let Some(mut conn) = self.guarded("play").await else {
            return Ok(());
        };
        if conn.is_playing().await {
            conn.stop().await?;
        }
        info!("playing {}", source);
        conn.play(source).await
    }

    /// Halt the current stream. Guarded; idempotent when nothing plays.
    pub async fn stop(&self) -> Result<()> {
        let Some(mut conn) = self.guarded("stop").await else {
            return Ok(());
        };
        if conn.is_playing().await {
            info!("stopping playback");
            conn.stop().await?;
        }
        Ok(())
    }

    /// Pause when playing, resume otherwise. A single toggle: callers
    /// cannot force one of the two states directly.
    pub async fn toggle_pause(&self) -> Result<()> {
        let Some(mut conn) = self.guarded("toggle-pause").await else {
            return Ok(());
        };
        if conn.is_playing().await {
            info!("pausing playback");
            conn.pause().await
        } else {
            info!("resuming playback");
            conn.resume().await
        }
    }

    /// Whether audio is currently being produced; `false` when unconnected
    pub async fn is_playing(&self) -> bool {
        match self.guarded("is-playing").await {
            Some(mut conn) => conn.is_playing().await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    #[derive(Clone, Default)]
    struct OpLog(Arc<StdMutex<Vec<String>>>);

    impl OpLog {
        fn push(&self, op: impl Into<String>) {
            self.0.lock().unwrap().push(op.into());
        }

        fn snapshot(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FakeConn {
        log: OpLog,
        playing: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Connection for FakeConn {
        async fn play(&mut self, source: &SourceRef) -> Result<()> {
            self.log.push(format!("play {}", source));
            self.playing.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            self.log.push("stop");
            self.playing.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn pause(&mut self) -> Result<()> {
            self.log.push("pause");
            self.playing.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn resume(&mut self) -> Result<()> {
            self.log.push("resume");
            self.playing.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn is_playing(&mut self) -> bool {
            self.playing.load(Ordering::SeqCst)
        }

        async fn disconnect(&mut self) {
            self.log.push("disconnect");
            self.playing.store(false, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeConnector {
        log: OpLog,
        playing: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Target = &'static str;
        type Conn = FakeConn;

        async fn connect(&self, target: &Self::Target) -> Result<Self::Conn> {
            self.log.push(format!("connect {}", target));
            Ok(FakeConn {
                log: self.log.clone(),
                playing: Arc::clone(&self.playing),
            })
        }
    }

    fn session() -> (VoiceSession<FakeConnector>, OpLog) {
        let connector = FakeConnector::default();
        let log = connector.log.clone();
        (VoiceSession::new(connector), log)
    }

    fn url(name: &str) -> SourceRef {
        SourceRef::Url(format!("https://example.com/{name}"))
    }

    #[tokio::test]
    async fn operations_before_connect_are_safe_noops() {
        let (session, log) = session();

        assert!(session.play(&url("a")).await.is_ok());
        assert!(session.stop().await.is_ok());
        assert!(session.toggle_pause().await.is_ok());
        assert!(!session.is_playing().await);
        session.disconnect().await;

        assert!(log.snapshot().is_empty());
    }

    #[tokio::test]
    async fn connect_without_target_fails_and_keeps_prior_connection() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();

        let err = session.connect(None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTarget));

        // The prior connection is still live and usable
        session.play(&url("a")).await.unwrap();
        assert_eq!(log.snapshot(), vec!["connect alpha", "play https://example.com/a"]);
    }

    #[tokio::test]
    async fn connect_is_idempotent_for_the_same_target() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();
        session.connect(Some("alpha")).await.unwrap();

        assert_eq!(log.snapshot(), vec!["connect alpha"]);
    }

    #[tokio::test]
    async fn connect_to_different_target_replaces_handle() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();
        session.connect(Some("beta")).await.unwrap();

        // The old handle is discarded without an explicit disconnect
        assert_eq!(log.snapshot(), vec!["connect alpha", "connect beta"]);
    }

    #[tokio::test]
    async fn play_halts_the_previous_stream_first() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();

        session.play(&url("one")).await.unwrap();
        session.play(&url("two")).await.unwrap();

        assert_eq!(
            log.snapshot(),
            vec![
                "connect alpha",
                "play https://example.com/one",
                "stop",
                "play https://example.com/two",
            ]
        );
    }

    #[tokio::test]
    async fn stop_is_idempotent_when_nothing_is_playing() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();

        session.stop().await.unwrap();
        session.stop().await.unwrap();

        assert_eq!(log.snapshot(), vec!["connect alpha"]);
    }

    #[tokio::test]
    async fn toggle_pause_alternates_pause_and_resume() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();
        session.play(&url("one")).await.unwrap();

        session.toggle_pause().await.unwrap();
        assert!(!session.is_playing().await);

        session.toggle_pause().await.unwrap();
        assert!(session.is_playing().await);

        let ops = log.snapshot();
        assert_eq!(ops[2..].to_vec(), vec!["pause", "resume"]);
    }

    #[tokio::test]
    async fn disconnect_tears_down_and_is_idempotent() {
        let (session, log) = session();
        session.connect(Some("alpha")).await.unwrap();
        session.play(&url("one")).await.unwrap();

        session.disconnect().await;
        assert!(!session.is_playing().await);

        // Second disconnect is a guarded no-op
        session.disconnect().await;

        let ops = log.snapshot();
        assert_eq!(ops.last().unwrap(), "disconnect");
        assert_eq!(ops.iter().filter(|op| *op == "disconnect").count(), 1);
    }
}
