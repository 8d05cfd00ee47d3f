//! Source images: the named inputs stacked into a sprite.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::Result;
use crate::render::ImageInspector;

/// A single source image which contributes to a sprite.
#[derive(Debug, Clone)]
pub struct Source {
    /// Logical name of the source within its sprite: the file stem.
    pub name: String,

    /// Absolute path to the image.
    pub path: PathBuf,

    /// Pixel dimensions, fetched on first use and kept for the rest of the run.
    dimensions: OnceLock<(u32, u32)>,
}

impl Source {
    /// Create a source from a path, using the file stem as its name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            path,
            dimensions: OnceLock::new(),
        }
    }

    /// Create a source whose dimensions are already known.
    pub fn with_dimensions(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        let source = Self::new(path);
        let _ = source.dimensions.set((width, height));
        source
    }

    /// Width and height of the image in pixels.
    pub fn dimensions(&self, inspector: &dyn ImageInspector) -> Result<(u32, u32)> {
        if let Some(dimensions) = self.dimensions.get() {
            return Ok(*dimensions);
        }

        let dimensions = inspector.dimensions(&self.path)?;
        let _ = self.dimensions.set(dimensions);
        Ok(dimensions)
    }
}
