//! Playlist model: immutable tracks behind a circular cursor
//!
//! A `Playlist` is fixed at construction (no insertion or removal), so the
//! cursor arithmetic is always modulo the construction-time length.

use std::fmt;
use std::path::PathBuf;

use rand::Rng;

use crate::error::{Error, Result};

/// Opaque reference to a playable audio source.
///
/// The voice backend decides how to turn each variant into a live stream;
/// the core never opens or decodes anything itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Local audio file (sound clips)
    File(PathBuf),
    /// Remote source, e.g. a resolved video/stream URL
    Url(String),
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::File(path) => write!(f, "{}", path.display()),
            SourceRef::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A single playable track. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    title: String,
    source: SourceRef,
    /// Title in the originating catalog, when it differs from the resolved
    /// title. Kept for display/audit only.
    origin_title: Option<String>,
}

impl Track {
    pub fn new(title: impl Into<String>, source: SourceRef) -> Self {
        Self {
            title: title.into(),
            source,
            origin_title: None,
        }
    }

    /// Attach the catalog title the track was resolved from
    pub fn with_origin_title(mut self, origin_title: impl Into<String>) -> Self {
        self.origin_title = Some(origin_title.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn origin_title(&self) -> Option<&str> {
        self.origin_title.as_deref()
    }
}

/// Ordered, named collection of tracks with a circular "current" cursor
#[derive(Debug, Clone)]
pub struct Playlist {
    name: String,
    tracks: Vec<Track>,
    cursor: usize,
}

impl Playlist {
    /// Create a playlist positioned on its first track.
    ///
    /// Fails with [`Error::EmptyPlaylist`] when `tracks` is empty; every
    /// other operation may then assume at least one track exists.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::EmptyPlaylist);
        }
        Ok(Self {
            name: name.into(),
            tracks,
            cursor: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track under the cursor; no side effect
    pub fn current(&self) -> &Track {
        &self.tracks[self.cursor]
    }

    /// Advance the cursor, wrapping from the last track to the first
    pub fn next(&mut self) -> &Track {
        self.cursor = (self.cursor + 1) % self.tracks.len();
        self.current()
    }

    /// Step the cursor back, wrapping from the first track to the last
    pub fn previous(&mut self) -> &Track {
        self.cursor = (self.cursor + self.tracks.len() - 1) % self.tracks.len();
        self.current()
    }

    /// Move the cursor to a uniformly random track and return it.
    ///
    /// May reselect the current track; repeats are not suppressed.
    pub fn pick_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Track {
        self.cursor = rng.gen_range(0..self.tracks.len());
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(title: &str) -> Track {
        Track::new(title, SourceRef::Url(format!("https://example.com/{title}")))
    }

    fn playlist(titles: &[&str]) -> Playlist {
        Playlist::new("test", titles.iter().map(|t| track(t)).collect()).unwrap()
    }

    #[test]
    fn empty_playlist_is_rejected() {
        assert!(matches!(
            Playlist::new("empty", Vec::new()),
            Err(Error::EmptyPlaylist)
        ));
    }

    #[test]
    fn cursor_starts_at_first_track() {
        let pl = playlist(&["a", "b", "c"]);
        assert_eq!(pl.current().title(), "a");
    }

    #[test]
    fn next_wraps_around() {
        let mut pl = playlist(&["a", "b", "c"]);
        assert_eq!(pl.next().title(), "b");
        assert_eq!(pl.next().title(), "c");
        assert_eq!(pl.next().title(), "a");
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut pl = playlist(&["a", "b", "c"]);
        assert_eq!(pl.previous().title(), "c");
        assert_eq!(pl.previous().title(), "b");
    }

    #[test]
    fn full_rotation_returns_to_start() {
        for len in 1..=5 {
            let titles: Vec<String> = (0..len).map(|i| format!("t{i}")).collect();
            let refs: Vec<&str> = titles.iter().map(String::as_str).collect();

            let mut pl = playlist(&refs);
            let start = pl.current().clone();
            for _ in 0..len {
                pl.next();
            }
            assert_eq!(pl.current(), &start);

            for _ in 0..len {
                pl.previous();
            }
            assert_eq!(pl.current(), &start);
        }
    }

    #[test]
    fn next_then_previous_restores_current() {
        let mut pl = playlist(&["a", "b", "c", "d"]);
        pl.next();
        pl.next();
        let before = pl.current().clone();
        pl.next();
        pl.previous();
        assert_eq!(pl.current(), &before);
    }

    #[test]
    fn pick_random_is_a_member_and_becomes_current() {
        let mut pl = playlist(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = pl.pick_random(&mut rng).clone();
            assert!(pl.tracks().contains(&picked));
            assert_eq!(pl.current(), &picked);
        }
    }

    #[test]
    fn origin_title_is_kept_separately() {
        let t = track("resolved name").with_origin_title("catalog name");
        assert_eq!(t.title(), "resolved name");
        assert_eq!(t.origin_title(), Some("catalog name"));
        assert_eq!(track("plain").origin_title(), None);
    }
}
