//! Rendering module for sprig.
//!
//! Layout is computed here; pixel work is delegated to collaborators behind
//! the `ImageInspector`, `Composer` and `Optimiser` traits so the pipeline can
//! run against fakes in tests.

mod layout;
mod optimise;
mod png;

use std::path::Path;

use crate::error::Result;

pub use layout::{Layout, Position, ProjectLayout};
pub use optimise::PngOptimiser;
pub use png::{write_png, ImageBackend};

/// Reads image dimensions without decoding pixel data where possible.
pub trait ImageInspector: Sync {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;
}

/// A source image and its top-left corner within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub path: &'a Path,
    pub x: u32,
    pub y: u32,
}

/// Composes source images into a single encoded PNG.
pub trait Composer: Sync {
    fn compose(&self, placements: &[Placement<'_>], canvas: (u32, u32)) -> Result<Vec<u8>>;
}

/// Losslessly re-compresses an image in place.
pub trait Optimiser: Sync {
    /// Returns the number of bytes saved; 0 when no improvement was found.
    fn optimise(&self, path: &Path) -> Result<u64>;
}
