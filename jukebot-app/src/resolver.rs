//! Remote track resolution
//!
//! Turns a Spotify playlist id into an ordered list of playable tracks: the
//! playlist metadata comes from the Spotify Web API (client-credentials
//! flow), and each catalog entry is matched to a YouTube source through a
//! yt-dlp search. Entries that fail to resolve are skipped: a partial
//! playlist beats no playlist.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use songbird::input::{Compose, YoutubeDl};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use jukebot_core::{SourceRef, Track};

use crate::error::{Error, Result};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Resolution output: display name plus the tracks that survived
pub struct ResolvedPlaylist {
    pub name: String,
    pub tracks: Vec<Track>,
}

pub struct TrackResolver {
    http: Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<BearerToken>>,
}

struct BearerToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    name: String,
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    /// Null for entries the catalog can no longer resolve (e.g. removed or
    /// local tracks)
    track: Option<CatalogTrack>,
}

#[derive(Debug, Deserialize)]
struct CatalogTrack {
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

impl TrackResolver {
    pub fn new(http: Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    /// Resolve a catalog playlist id into playable tracks.
    ///
    /// Individual entries that cannot be matched are logged and skipped;
    /// the caller decides what an empty result means.
    pub async fn resolve(&self, playlist_id: &str) -> Result<ResolvedPlaylist> {
        let playlist = self.fetch_playlist(playlist_id).await?;
        info!(
            "matching {} entries from playlist '{}'",
            playlist.tracks.items.len(),
            playlist.name
        );

        let mut tracks = Vec::new();
        for item in &playlist.tracks.items {
            let Some(entry) = &item.track else {
                debug!("skipping entry without a track record");
                continue;
            };
            match self.resolve_entry(entry).await {
                Ok(track) => tracks.push(track),
                Err(e) => warn!("skipping '{}': {}", entry.name, e),
            }
        }

        Ok(ResolvedPlaylist {
            name: playlist.name,
            tracks,
        })
    }

    /// Find a playable counterpart for one catalog entry
    async fn resolve_entry(&self, entry: &CatalogTrack) -> Result<Track> {
        let query = search_query(entry);
        let mut search = YoutubeDl::new_search(self.http.clone(), query.clone());
        let meta = search
            .aux_metadata()
            .await
            .map_err(|e| Error::Resolve(format!("no playable match for '{query}': {e}")))?;

        let url = meta
            .source_url
            .ok_or_else(|| Error::Resolve(format!("match for '{query}' carries no URL")))?;
        let title = meta.title.unwrap_or_else(|| entry.name.clone());

        Ok(Track::new(title, SourceRef::Url(url)).with_origin_title(&entry.name))
    }

    async fn fetch_playlist(&self, id: &str) -> Result<PlaylistResponse> {
        let token = self.bearer_token().await?;
        let response = self
            .http
            .get(format!("{API_BASE}/playlists/{id}"))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Resolve(format!("playlist lookup failed: {e}")))?;
        Ok(response.json().await?)
    }

    /// Client-credentials bearer token, cached and refreshed a minute early
    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Resolve(format!("token request failed: {e}")))?
            .json()
            .await?;

        let value = response.access_token.clone();
        *cached = Some(BearerToken {
            value: response.access_token,
            expires_at: Instant::now()
                + Duration::from_secs(response.expires_in.saturating_sub(60)),
        });
        Ok(value)
    }
}

fn search_query(entry: &CatalogTrack) -> String {
    let artists = entry
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if artists.is_empty() {
        entry.name.clone()
    } else {
        format!("{} {}", entry.name, artists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST_JSON: &str = r#"{
        "name": "Road Trip",
        "tracks": {
            "items": [
                { "track": { "name": "Song One", "artists": [{ "name": "Ana" }, { "name": "Bo" }] } },
                { "track": null },
                { "track": { "name": "Song Two", "artists": [] } }
            ]
        }
    }"#;

    #[test]
    fn playlist_payload_parses_with_null_entries() {
        let playlist: PlaylistResponse = serde_json::from_str(PLAYLIST_JSON).unwrap();
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.tracks.items.len(), 3);
        assert!(playlist.tracks.items[1].track.is_none());

        let first = playlist.tracks.items[0].track.as_ref().unwrap();
        assert_eq!(first.name, "Song One");
        assert_eq!(first.artists.len(), 2);
    }

    #[test]
    fn token_payload_parses() {
        let token: TokenResponse = serde_json::from_str(
            r#"{ "access_token": "abc123", "token_type": "Bearer", "expires_in": 3600 }"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc123");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn search_query_appends_artists() {
        let playlist: PlaylistResponse = serde_json::from_str(PLAYLIST_JSON).unwrap();
        let with_artists = playlist.tracks.items[0].track.as_ref().unwrap();
        assert_eq!(search_query(with_artists), "Song One Ana Bo");

        let without = playlist.tracks.items[2].track.as_ref().unwrap();
        assert_eq!(search_query(without), "Song Two");
    }
}
