//! sprig - Sprite and stylesheet generator
//!
//! Composes directories of source images into vertical sprite sheets and
//! writes Sass mixins (and optionally plain CSS) that position each source.
//! Sprites whose sources are unchanged since the last build are skipped.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod stylesheet;
pub mod types;
pub mod validation;

pub use cache::Cache;
pub use config::{load_project, resolve, RawConfig};
pub use error::{ConfigError, Result, SprigError};
pub use pipeline::{Backends, BuildOptions, BuildReport, OptimiseOptions, Pipeline};
pub use render::{Layout, Position};
pub use types::{Project, ProjectSettings, SaveTarget, Source, Sprite};
pub use validation::{check_project, CheckReport, Diagnostic, Severity};
