//! Screenshot files.
//!
//! Named screenshots land at `<dir>/<name>.png`; failure captures get a
//! timestamp so reruns never overwrite each other.

use crate::result::{SaucerError, SaucerResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory that receives screenshot files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    /// Store rooted at `dir` (created lazily)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a named screenshot
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", sanitize(name)))
    }

    /// Timestamped path for the capture taken when `test_name` fails
    #[must_use]
    pub fn failure_path(&self, test_name: &str) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.dir
            .join(format!("failure_{}_{stamp}.png", sanitize(test_name)))
    }

    /// Write PNG bytes to `path`, creating the directory when absent
    pub fn write(&self, path: &Path, png: &[u8]) -> SaucerResult<()> {
        if png.is_empty() {
            return Err(SaucerError::ScreenshotError {
                message: "driver returned an empty image".to_string(),
            });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, png)?;
        tracing::info!(path = %path.display(), bytes = png.len(), "screenshot saved");
        Ok(())
    }
}

// Scenario ids and step names end up in file names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for() {
        let store = ScreenshotStore::new("shots");
        assert_eq!(store.path_for("login"), PathBuf::from("shots/login.png"));
    }

    #[test]
    fn test_unsafe_characters_replaced() {
        let store = ScreenshotStore::new("shots");
        assert_eq!(
            store.path_for("cart/view items"),
            PathBuf::from("shots/cart_view_items.png")
        );
    }

    #[test]
    fn test_failure_path_shape() {
        let store = ScreenshotStore::new("shots");
        let path = store.failure_path("TC_AUTH_01");
        let file = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.starts_with("failure_TC_AUTH_01_"));
        assert!(file.ends_with(".png"));
        // failure_TC_AUTH_01_YYYYmmdd_HHMMSS.png
        assert_eq!(file.len(), "failure_TC_AUTH_01_".len() + 15 + 4);
    }

    #[test]
    fn test_write_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(tmp.path().join("nested").join("shots"));
        let path = store.path_for("home");

        store.write(&path, &[0x89, 0x50, 0x4E, 0x47]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_empty_image_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(tmp.path());
        let err = store.write(&store.path_for("x"), &[]).unwrap_err();
        assert!(matches!(err, SaucerError::ScreenshotError { .. }));
    }
}
