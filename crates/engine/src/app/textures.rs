use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::texture_keys::{validate_texture_key, TextureKeyError};

#[derive(Debug, Error)]
pub enum TextureSetError {
    #[error("failed to read texture directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid texture key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: TextureKeyError,
    },
}

/// Texture keys known to the app, mapped to their image files.
///
/// Keys registered without a file (tests, headless runs) still count as
/// loaded; the renderer draws those as flat tinted rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSet {
    entries: BTreeMap<String, Option<PathBuf>>,
}

impl TextureSet {
    /// Registers every `<key>.png` directly inside `dir`.
    pub fn scan_dir(dir: &Path) -> Result<Self, TextureSetError> {
        let read_dir = fs::read_dir(dir).map_err(|source| TextureSetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut entries = BTreeMap::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| TextureSetError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            validate_texture_key(stem).map_err(|source| TextureSetError::InvalidKey {
                key: stem.to_string(),
                source,
            })?;
            entries.insert(stem.to_string(), Some(path.clone()));
        }
        Ok(Self { entries })
    }

    pub fn from_keys<I, S>(keys: I) -> Result<Self, TextureSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for key in keys {
            let key = key.into();
            validate_texture_key(&key)
                .map_err(|source| TextureSetError::InvalidKey { key: key.clone(), source })?;
            entries.insert(key, None);
        }
        Ok(Self { entries })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn path(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).and_then(|path| path.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scan_registers_png_stems_only() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("title.png"), b"png").expect("write");
        fs::write(dir.path().join("game_bg.png"), b"png").expect("write");
        fs::write(dir.path().join("notes.txt"), b"txt").expect("write");
        fs::create_dir(dir.path().join("nested.png")).expect("mkdir");

        let set = TextureSet::scan_dir(dir.path()).expect("scan");

        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["game_bg", "title"]);
        assert_eq!(set.path("title"), Some(dir.path().join("title.png").as_path()));
        assert!(!set.contains("notes"));
    }

    #[test]
    fn scan_rejects_invalid_key() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("Title.png"), b"png").expect("write");

        let err = TextureSet::scan_dir(dir.path()).expect_err("invalid key");
        assert!(matches!(err, TextureSetError::InvalidKey { ref key, .. } if key == "Title"));
    }

    #[test]
    fn scan_missing_dir_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("missing");
        let err = TextureSet::scan_dir(&missing).expect_err("missing dir");
        assert!(matches!(err, TextureSetError::ReadDir { ref path, .. } if path == &missing));
    }

    #[test]
    fn keys_without_files_have_no_path() {
        let set = TextureSet::from_keys(["panel", "house"]).expect("keys");
        assert!(set.contains("panel"));
        assert_eq!(set.path("panel"), None);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }

    #[test]
    fn scan_of_empty_dir_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let set = TextureSet::scan_dir(dir.path()).expect("scan");
        assert!(set.is_empty());
    }
}
