//! Project type: the resolved configuration of a sprig project.

use std::path::PathBuf;

use crate::error::Result;
use crate::render::{ImageInspector, ProjectLayout};

use super::Sprite;

/// Project-wide settings after defaults have been applied.
///
/// Paths are absolute; `None` means the output (or cache) is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Default padding between sources.
    pub padding: u32,

    /// URL template with `:name` and `:filename` placeholders.
    pub url: String,

    /// Sass output file or directory.
    pub sass: Option<PathBuf>,

    /// Plain CSS output file or directory.
    pub css: Option<PathBuf>,

    /// Cache file.
    pub cache: Option<PathBuf>,
}

/// A resolved project: settings plus every sprite it defines, in declaration order.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing the config; relative paths resolve against it.
    pub root: PathBuf,

    /// The config file the project was loaded from, if any.
    pub config_path: Option<PathBuf>,

    pub settings: ProjectSettings,

    pub sprites: Vec<Sprite>,
}

impl Project {
    /// Get a sprite by name.
    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.name == name)
    }

    /// Sprites which are inlined into the stylesheet.
    pub fn data_uri_sprites(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter().filter(|s| s.is_data_uri())
    }

    /// Names of every sprite, in declaration order.
    pub fn sprite_names(&self) -> impl Iterator<Item = &str> {
        self.sprites.iter().map(|s| s.name.as_str())
    }

    /// Lay out every sprite in the project.
    pub fn lay_out(&self, inspector: &dyn ImageInspector) -> Result<ProjectLayout<'_>> {
        let layouts = self
            .sprites
            .iter()
            .map(|sprite| sprite.layout(inspector))
            .collect::<Result<Vec<_>>>()?;

        Ok(ProjectLayout::new(self, layouts))
    }
}
