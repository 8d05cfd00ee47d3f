//! Sprite type: one composite image and the sources stacked inside it.

use std::path::{Path, PathBuf};

use crate::error::{Result, SprigError};
use crate::render::{ImageInspector, Layout};

use super::Source;

/// Where a sprite's image ends up once it has been composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Written to a PNG file on disk.
    File(PathBuf),
    /// Never written to the project; the bytes are inlined in the stylesheet.
    DataUri,
}

impl SaveTarget {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SaveTarget::File(path) => Some(path),
            SaveTarget::DataUri => None,
        }
    }
}

/// A sprite definition after resolution.
///
/// Sprites are immutable once resolved; source order determines where each
/// source is placed in the composed image.
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Sprite name (unique within a project).
    pub name: String,

    /// Source images in stacking order.
    pub sources: Vec<Source>,

    /// Destination of the composed image.
    pub target: SaveTarget,

    /// Transparent space between each source, in pixels.
    pub padding: u32,

    /// Public URL of the image; `None` for data URI sprites.
    pub url: Option<String>,
}

impl Sprite {
    pub fn new(
        name: impl Into<String>,
        sources: Vec<Source>,
        target: SaveTarget,
        padding: u32,
        url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sources,
            target,
            padding,
            url,
        }
    }

    /// Index of a source in stacking order.
    pub fn source_index(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.name == name)
    }

    /// Path of the composed image, if it is saved to disk.
    pub fn save_path(&self) -> Option<&Path> {
        self.target.path()
    }

    pub fn is_data_uri(&self) -> bool {
        self.target == SaveTarget::DataUri
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The identifier used to address a source from stylesheets: `sprite/source`.
    pub fn key_for(&self, source: &Source) -> String {
        format!("{}/{}", self.name, source.name)
    }

    /// Class holding the inlined image of a data URI sprite.
    pub fn data_class(&self) -> String {
        format!("{}_data", self.name)
    }

    /// Compute where each source sits within the composed image.
    pub fn layout(&self, inspector: &dyn ImageInspector) -> Result<Layout> {
        let sizes = self
            .sources
            .iter()
            .map(|source| source.dimensions(inspector))
            .collect::<Result<Vec<_>>>()?;

        Layout::stack(&sizes, self.padding).ok_or_else(|| SprigError::Render {
            sprite: self.name.clone(),
            message: "sources and padding are taller than the largest possible image".to_string(),
        })
    }
}
