//! Core domain types for sprig.
//!
//! - `Project` - the root build unit: resolved sprites plus global settings
//! - `Sprite` - one composite image assembled from an ordered list of sources
//! - `Source` - one input image, addressed by its logical name

mod project;
mod source;
mod sprite;

pub use project::{Project, ProjectSettings};
pub use source::Source;
pub use sprite::{SaveTarget, Sprite};
