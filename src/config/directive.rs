//! Front-end independent configuration.
//!
//! Both config syntaxes produce a [`RawConfig`]: an ordered list of
//! directives, exactly as declared. Nothing here is resolved: global options
//! may follow the sprites they affect, and sprite options stay optional so
//! an explicit `padding: 0` is distinguishable from no padding at all.

use std::path::PathBuf;

use crate::error::ConfigError;

/// An option value as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Bool(bool),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "\"{}\"", s),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

fn invalid(option: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidOption {
        option: option.to_string(),
        message: message.into(),
    }
}

/// Padding accepts a non-negative integer, or `false` for none.
fn parse_padding(option: &str, value: Scalar) -> Result<u32, ConfigError> {
    match value {
        Scalar::Integer(n) => u32::try_from(n)
            .map_err(|_| invalid(option, format!("{} is not a valid number of pixels", n))),
        Scalar::Bool(false) => Ok(0),
        other => Err(invalid(option, format!("expected a number of pixels, found {}", other))),
    }
}

fn parse_string(option: &str, value: Scalar) -> Result<String, ConfigError> {
    match value {
        Scalar::String(s) => Ok(s),
        other => Err(invalid(option, format!("expected a string, found {}", other))),
    }
}

/// A path-valued global option which can also be turned off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSetting {
    Path(String),
    Disabled,
}

impl PathSetting {
    fn parse(option: &str, value: Scalar) -> Result<Self, ConfigError> {
        match value {
            Scalar::String(path) => Ok(PathSetting::Path(path)),
            Scalar::Bool(false) => Ok(PathSetting::Disabled),
            other => Err(invalid(option, format!("expected a path or false, found {}", other))),
        }
    }
}

/// A project-wide option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalOption {
    Cache(PathSetting),
    Sass(PathSetting),
    Css(PathSetting),
    Padding(u32),
    Url(String),
}

impl GlobalOption {
    /// Option names accepted by both front-ends.
    pub const NAMES: &'static [&'static str] = &["cache", "css", "padding", "sass", "url"];

    /// Build an option from its name and value.
    pub fn parse(name: &str, value: Scalar) -> Result<Self, ConfigError> {
        match name {
            "cache" => PathSetting::parse(name, value).map(GlobalOption::Cache),
            "css" => PathSetting::parse(name, value).map(GlobalOption::Css),
            "sass" => PathSetting::parse(name, value).map(GlobalOption::Sass),
            "padding" => parse_padding(name, value).map(GlobalOption::Padding),
            "url" => parse_string(name, value).map(GlobalOption::Url),
            _ => Err(invalid(
                name,
                format!("unknown option, expected one of {}", Self::NAMES.join(", ")),
            )),
        }
    }
}

/// Where a sprite should be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path relative to the project root; may contain `:name`.
    Path(String),
    /// Inline the image in the stylesheet.
    DataUri,
}

impl Target {
    /// The word used for data URI targets in config files.
    pub const DATA_URI: &'static str = "data_uri";

    pub fn parse(destination: &str) -> Self {
        if destination == Self::DATA_URI {
            Target::DataUri
        } else {
            Target::Path(destination.to_string())
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Path(path) => write!(f, "{}", path),
            Target::DataUri => write!(f, "{}", Self::DATA_URI),
        }
    }
}

/// Per-sprite options. Absent fields fall back to the project settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteOptions {
    pub name: Option<String>,
    pub padding: Option<u32>,
    pub url: Option<String>,
}

impl SpriteOptions {
    /// Option names which can't be mistaken for a source path.
    pub const NAMES: &'static [&'static str] = &["name", "padding", "url"];

    pub fn is_option(key: &str) -> bool {
        Self::NAMES.contains(&key)
    }

    /// Record an option while a declaration is being read.
    pub fn set(&mut self, name: &str, value: Scalar) -> Result<(), ConfigError> {
        match name {
            "name" => self.name = Some(parse_string(name, value)?),
            "padding" => self.padding = Some(parse_padding(name, value)?),
            "url" => self.url = Some(parse_string(name, value)?),
            _ => {
                return Err(invalid(
                    name,
                    format!("unknown sprite option, expected one of {}", Self::NAMES.join(", ")),
                ))
            }
        }
        Ok(())
    }
}

/// A sprite declaration: `{ source => target }` plus options.
///
/// `mappings` holds every source/target pair found in the declaration;
/// a valid declaration has exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteDirective {
    pub mappings: Vec<(String, Target)>,
    pub options: SpriteOptions,
}

impl SpriteDirective {
    pub fn new(source: impl Into<String>, target: Target) -> Self {
        Self {
            mappings: vec![(source.into(), target)],
            options: SpriteOptions::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.options.padding = Some(padding);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.options.url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Global(GlobalOption),
    Sprite(SpriteDirective),
}

/// Everything declared in a config file, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConfig {
    /// Directory relative paths resolve against.
    pub root: PathBuf,

    /// The file the directives came from.
    pub config_path: Option<PathBuf>,

    pub directives: Vec<Directive>,
}

impl RawConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_path: None,
            directives: Vec::new(),
        }
    }

    pub fn global(mut self, option: GlobalOption) -> Self {
        self.directives.push(Directive::Global(option));
        self
    }

    pub fn sprite(mut self, sprite: SpriteDirective) -> Self {
        self.directives.push(Directive::Sprite(sprite));
        self
    }

    pub fn globals(&self) -> impl Iterator<Item = &GlobalOption> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Global(option) => Some(option),
            Directive::Sprite(_) => None,
        })
    }

    pub fn sprites(&self) -> impl Iterator<Item = &SpriteDirective> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Sprite(sprite) => Some(sprite),
            Directive::Global(_) => None,
        })
    }
}
