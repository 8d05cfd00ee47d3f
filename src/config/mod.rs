//! Project configuration: discovery, parsing and resolution.
//!
//! A project is found by ascending from the working directory until a config
//! file turns up. Either front-end ([`dsl`] or [`yaml`]) turns the file into a
//! [`RawConfig`], which the [`resolver`] turns into a [`Project`].

pub mod directive;
pub mod dsl;
pub mod glob;
pub mod resolver;
pub mod yaml;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SprigError};
use crate::types::Project;

pub use directive::{Directive, GlobalOption, PathSetting, RawConfig, Scalar, SpriteDirective, SpriteOptions, Target};
pub use resolver::resolve;

/// Config file names, in order of preference.
pub const CONFIG_FILENAMES: &[&str] = &[".sprig", "sprig.yaml", "sprig.yml"];

pub const DEFAULT_SASS: &str = "public/stylesheets/sass";
pub const DEFAULT_CSS: PathSetting = PathSetting::Disabled;
pub const DEFAULT_PADDING: u32 = 20;
pub const DEFAULT_URL: &str = "/images/:filename";
pub const DEFAULT_CACHE: &str = ".sprig-cache";

/// The syntax of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Dsl,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file name: `.yaml`/`.yml` are YAML, anything else is DSL.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Dsl,
        }
    }
}

/// Find the config file for the project containing `start`.
///
/// A file path is taken as the config itself. A directory is searched, then
/// each of its parents.
pub fn find_config(start: &Path) -> Result<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()?.join(start)
    };

    if start.is_file() {
        return Ok(start);
    }

    search_upwards(start, None)
}

/// Search `start` and its parents for a config, stopping after `ceiling`.
fn search_upwards(start: PathBuf, ceiling: Option<&Path>) -> Result<PathBuf> {
    for dir in start.ancestors() {
        for name in CONFIG_FILENAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                debug!(config = ?candidate, "found project config");
                return Ok(candidate);
            }
        }
        if Some(dir) == ceiling {
            break;
        }
    }

    Err(SprigError::MissingProject { path: start })
}

/// Parse config text. Relative paths resolve against `root`.
pub fn parse_config(content: &str, root: &Path, format: ConfigFormat) -> Result<RawConfig> {
    match format {
        ConfigFormat::Dsl => dsl::parse(content, root),
        ConfigFormat::Yaml => yaml::parse(content, root),
    }
}

/// Read and parse a config file. The project root is the file's directory.
pub fn load_config(path: &Path) -> Result<RawConfig> {
    let content = fs::read_to_string(path).map_err(|e| SprigError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read config: {}", e),
    })?;

    let root = path.parent().unwrap_or(Path::new("."));
    let mut config = parse_config(&content, root, ConfigFormat::from_path(path))?;
    config.config_path = Some(path.to_path_buf());
    Ok(config)
}

/// Find, parse and resolve the project containing `start`.
pub fn load_project(start: &Path) -> Result<Project> {
    let path = find_config(start)?;
    let config = load_config(&path)?;
    resolve(&config)
}
