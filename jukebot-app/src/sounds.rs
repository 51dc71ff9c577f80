//! Local clip library
//!
//! Sound clips are plain `.mp3` files in the configured sounds directory,
//! addressed everywhere by their file stem.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::info;

use crate::error::{Error, Result};

pub const CLIP_EXTENSION: &str = "mp3";

/// Clip names available in `dir`, sorted
pub async fn list(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(CLIP_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Resolve a clip name to its file path.
///
/// Rejects names that could escape the sounds directory.
pub fn clip_path(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::InvalidClipName(name.to_string()));
    }
    Ok(dir.join(format!("{name}.{CLIP_EXTENSION}")))
}

/// Fetch `url` and store it as a named clip
pub async fn download(http: &Client, url: &str, dir: &Path, name: &str) -> Result<PathBuf> {
    let path = clip_path(dir, name)?;
    let bytes = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    tokio::fs::write(&path, &bytes).await?;
    info!("downloaded soundbit '{}' from {}", name, url);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn list_returns_sorted_mp3_stems() {
        let dir = TempDir::new().unwrap();
        for file in ["zebra.mp3", "alpha.mp3", "notes.txt", "beta.mp3"] {
            std::fs::write(dir.path().join(file), b"x").unwrap();
        }

        let names = list(dir.path()).await.unwrap();
        assert_eq!(names, vec!["alpha", "beta", "zebra"]);
    }

    #[tokio::test]
    async fn list_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list(&missing).await.is_err());
    }

    #[test]
    fn clip_path_appends_extension() {
        let path = clip_path(Path::new("/srv/sounds"), "horn").unwrap();
        assert_eq!(path, PathBuf::from("/srv/sounds/horn.mp3"));
    }

    #[test]
    fn clip_path_rejects_traversal() {
        let dir = Path::new("/srv/sounds");
        for name in ["", "../horn", "a/b", "a\\b", ".."] {
            assert!(
                matches!(clip_path(dir, name), Err(Error::InvalidClipName(_))),
                "expected rejection for {name:?}"
            );
        }
    }
}
