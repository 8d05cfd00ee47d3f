//! Persistent build cache.
//!
//! The cache maps keys to content digests recorded after the last successful
//! build. It has two namespaces sharing one file:
//!
//! - `sprite:<name>` - digest of a sprite's inputs when it was last composed
//! - `file:<path>` - digest of an image file when it was last optimised
//!
//! Keeping them apart means forcing a recompose does not mark the output as
//! optimised, and optimising a file does not mark its sprite as composed.
//!
//! Digests are SHA-256 hashes of file contents rather than modification
//! times, so the cache stays valid across fresh checkouts and copies.
//!
//! # Example
//!
//! ```ignore
//! let mut cache = Cache::for_project(&project)?;
//! if cache.is_sprite_stale(sprite) {
//!     // compose...
//!     cache.set_sprite(sprite)?;
//! }
//! cache.write()?;
//! ```

mod digest;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{SprigError, Result};
use crate::types::{Project, Sprite};

pub use digest::{file_digest, sprite_digest};

/// On-disk format version. Files with any other version are discarded.
pub const CACHE_VERSION: u32 = 1;

const SPRITE_PREFIX: &str = "sprite:";
const FILE_PREFIX: &str = "file:";

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Tracks digests of sprites and files between builds.
#[derive(Debug)]
pub struct Cache {
    /// Cache file; `None` keeps the cache in memory only.
    path: Option<PathBuf>,

    /// Root that file keys are relative to.
    root: PathBuf,

    entries: BTreeMap<String, String>,

    dirty: bool,
}

impl Cache {
    /// A cache with no backing file.
    pub fn in_memory(root: impl Into<PathBuf>) -> Self {
        Self::empty(None, root)
    }

    /// An empty cache which will be saved to `path`.
    pub fn empty(path: Option<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            path,
            root: root.into(),
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load the cache from `path`.
    ///
    /// A missing file yields an empty cache. A malformed file, or one written
    /// by a different format version, is reported as `CacheCorruption`; callers
    /// recover with [`Cache::empty`].
    pub fn load(path: Option<PathBuf>, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let Some(path) = path else {
            return Ok(Self::in_memory(root));
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(Some(path), root));
            }
            Err(e) => {
                return Err(SprigError::Io {
                    path,
                    message: format!("Failed to read cache: {}", e),
                })
            }
        };

        let file: CacheFile =
            serde_json::from_str(&content).map_err(|e| SprigError::CacheCorruption {
                path: path.clone(),
                message: e.to_string(),
            })?;

        if file.version != CACHE_VERSION {
            return Err(SprigError::CacheCorruption {
                path,
                message: format!("unsupported version {}", file.version),
            });
        }

        debug!(path = ?path, entries = file.entries.len(), "loaded cache");

        Ok(Self {
            path: Some(path),
            root,
            entries: file.entries,
            dirty: false,
        })
    }

    /// Load the cache configured for a project.
    pub fn for_project(project: &Project) -> Result<Self> {
        Self::load(project.settings.cache.clone(), project.root.clone())
    }

    /// Whether the sprite needs to be composed again.
    ///
    /// True when there is no entry, when any input changed or went missing,
    /// or when the sprite's image file no longer exists.
    pub fn is_sprite_stale(&self, sprite: &Sprite) -> bool {
        if let Some(path) = sprite.save_path() {
            if !path.is_file() {
                return true;
            }
        }

        let Some(recorded) = self.entries.get(&sprite_key(&sprite.name)) else {
            return true;
        };

        match sprite_digest(sprite) {
            Ok(current) => &current != recorded,
            Err(_) => true,
        }
    }

    /// Record the sprite's current inputs.
    pub fn set_sprite(&mut self, sprite: &Sprite) -> Result<()> {
        let digest = sprite_digest(sprite)?;
        self.insert(sprite_key(&sprite.name), digest);
        Ok(())
    }

    /// Whether a file changed since it was last recorded.
    pub fn is_file_stale(&self, path: &Path) -> bool {
        let Some(recorded) = self.entries.get(&self.file_key(path)) else {
            return true;
        };

        match file_digest(&self.resolve(path)) {
            Ok(current) => &current != recorded,
            Err(_) => true,
        }
    }

    /// Record a file's current contents.
    pub fn set_file(&mut self, path: &Path) -> Result<()> {
        let digest = file_digest(&self.resolve(path))?;
        self.insert(self.file_key(path), digest);
        Ok(())
    }

    /// Drop entries for files which no longer exist and sprites which are
    /// no longer defined.
    pub fn clean<'a>(&mut self, live_sprites: impl IntoIterator<Item = &'a str>) {
        let live: BTreeSet<&str> = live_sprites.into_iter().collect();
        let root = self.root.clone();
        let before = self.entries.len();

        self.entries.retain(|key, _| {
            if let Some(name) = key.strip_prefix(SPRITE_PREFIX) {
                live.contains(name)
            } else if let Some(path) = key.strip_prefix(FILE_PREFIX) {
                root.join(path).exists()
            } else {
                false
            }
        });

        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "cleaned cache");
            self.dirty = true;
        }
    }

    /// Save the cache, replacing the file atomically.
    ///
    /// Does nothing for an in-memory cache, or when nothing changed since the
    /// cache was loaded and the file already exists.
    pub fn write(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if !self.dirty && path.is_file() {
            return Ok(());
        }

        let io_error = |e: std::io::Error| SprigError::Io {
            path: path.clone(),
            message: format!("Failed to write cache: {}", e),
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_error)?;

        let file = CacheFile {
            version: CACHE_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| SprigError::Io {
            path: path.clone(),
            message: format!("Failed to serialize cache: {}", e),
        })?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_error)?;
        tmp.write_all(json.as_bytes()).map_err(io_error)?;
        tmp.persist(path).map_err(|e| io_error(e.error))?;

        debug!(path = ?path, entries = self.entries.len(), "wrote cache");
        self.dirty = false;
        Ok(())
    }

    fn insert(&mut self, key: String, digest: String) {
        if self.entries.get(&key) != Some(&digest) {
            self.entries.insert(key, digest);
            self.dirty = true;
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn file_key(&self, path: &Path) -> String {
        let absolute = self.resolve(path);
        let Ok(relative) = absolute.strip_prefix(&self.root) else {
            return format!("{}{}", FILE_PREFIX, absolute.display());
        };

        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        format!("{}{}", FILE_PREFIX, segments.join("/"))
    }
}

fn sprite_key(name: &str) -> String {
    format!("{}{}", SPRITE_PREFIX, name)
}
