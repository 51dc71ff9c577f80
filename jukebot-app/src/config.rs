//! Startup configuration
//!
//! Everything is read once at startup. The sounds directory resolves through
//! a priority chain: command-line argument, environment variable (both via
//! clap), `jukebot/config.toml` in the user config directory, then an
//! OS-dependent data-directory default.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Command-line arguments for jukebot
#[derive(Parser, Debug)]
#[command(name = "jukebot")]
#[command(about = "Voice-channel soundboard and playlist bot")]
#[command(version)]
pub struct Args {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Spotify client id, used by the playlist command
    #[arg(long, env = "SPOTIFY_CLIENT_ID", default_value = "")]
    pub spotify_client_id: String,

    /// Spotify client secret, used by the playlist command
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub spotify_client_secret: String,

    /// Directory holding the .mp3 sound clips
    #[arg(long, env = "JUKEBOT_SOUNDS_DIR")]
    pub sounds_dir: Option<PathBuf>,

    /// Host the HTTP trigger server binds to
    #[arg(long, env = "JUKEBOT_HTTP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP trigger server listens on
    #[arg(long, env = "JUKEBOT_HTTP_PORT", default_value = "5870")]
    pub port: u16,

    /// Chat command prefix, a single character
    #[arg(long, env = "JUKEBOT_PREFIX", default_value = "*")]
    pub prefix: String,
}

/// Runtime configuration derived from [`Args`]
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub sounds_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub prefix: String,
}

/// Optional `jukebot/config.toml` in the user config directory
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    sounds_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.prefix.chars().count() != 1 {
            return Err(Error::Config(format!(
                "command prefix must be a single character, got '{}'",
                args.prefix
            )));
        }

        let sounds_dir = args
            .sounds_dir
            .or_else(config_file_sounds_dir)
            .unwrap_or_else(default_sounds_dir);

        Ok(Self {
            discord_token: args.discord_token,
            spotify_client_id: args.spotify_client_id,
            spotify_client_secret: args.spotify_client_secret,
            sounds_dir,
            host: args.host,
            port: args.port,
            prefix: args.prefix,
        })
    }
}

fn config_file_sounds_dir() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("jukebot").join("config.toml");
    let raw = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&raw) {
        Ok(file) => file.sounds_dir,
        Err(e) => {
            warn!("ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

fn default_sounds_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("jukebot").join("sounds"))
        .unwrap_or_else(|| PathBuf::from("./sounds"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            discord_token: "token".into(),
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            sounds_dir: None,
            host: "127.0.0.1".into(),
            port: 5870,
            prefix: "*".into(),
        }
    }

    #[test]
    fn explicit_sounds_dir_wins() {
        let mut a = args();
        a.sounds_dir = Some(PathBuf::from("/tmp/clips"));
        let config = Config::from_args(a).unwrap();
        assert_eq!(config.sounds_dir, PathBuf::from("/tmp/clips"));
    }

    #[test]
    fn multi_character_prefix_is_rejected() {
        let mut a = args();
        a.prefix = "!!".into();
        assert!(matches!(Config::from_args(a), Err(Error::Config(_))));
    }

    #[test]
    fn config_file_shape_parses() {
        let file: FileConfig = toml::from_str("sounds_dir = \"/srv/jukebot/sounds\"").unwrap();
        assert_eq!(file.sounds_dir, Some(PathBuf::from("/srv/jukebot/sounds")));

        let empty: FileConfig = toml::from_str("").unwrap();
        assert!(empty.sounds_dir.is_none());
    }
}
