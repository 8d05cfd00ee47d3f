use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for sprig operations
#[derive(Error, Diagnostic, Debug)]
pub enum SprigError {
    #[error("IO error: {0}")]
    #[diagnostic(code(sprig::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(sprig::io))]
    Io { path: PathBuf, message: String },

    #[error("Parse error: {message}")]
    #[diagnostic(code(sprig::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Couldn't find a sprig project at {path} or any of its parent directories")]
    #[diagnostic(
        code(sprig::missing_project),
        help("Run `sprig init` to create a new project here")
    )]
    MissingProject { path: PathBuf },

    #[error("A sprig config already exists: {path}")]
    #[diagnostic(code(sprig::config_exists), help("Use --force to overwrite it"))]
    ConfigExists { path: PathBuf },

    #[error("Source image is missing: {path}")]
    #[diagnostic(code(sprig::missing_source))]
    MissingSource { path: PathBuf },

    #[error("Can't write sprite to {path}: {message}")]
    #[diagnostic(code(sprig::not_writable))]
    TargetNotWritable { path: PathBuf, message: String },

    #[error("Cache file {path} is unreadable ({message}); rebuilding everything")]
    #[diagnostic(code(sprig::cache))]
    CacheCorruption { path: PathBuf, message: String },

    #[error("Failed to render sprite `{sprite}`: {message}")]
    #[diagnostic(code(sprig::render))]
    Render { sprite: String, message: String },

    #[error("Failed to optimise {path}: {message}")]
    #[diagnostic(code(sprig::optimise))]
    Optimise { path: PathBuf, message: String },

    #[error("No such sprite: {name}")]
    #[diagnostic(code(sprig::unknown_sprite))]
    UnknownSprite { name: String },

    #[error("No such source: {name}")]
    #[diagnostic(code(sprig::unknown_source))]
    UnknownSource { name: String },

    #[error("Build error: {message}")]
    #[diagnostic(code(sprig::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

/// Problems with the declared sprites, detected before anything is rendered.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Sprite definition is missing a {{ source => sprite }} pair")]
    #[diagnostic(code(sprig::config::missing_mapping))]
    MissingMapping,

    #[error("Sprite definition has more than one {{ source => sprite }} pair: {sources}")]
    #[diagnostic(code(sprig::config::multiple_mappings))]
    MultipleMappings { sources: String },

    #[error("A sprite named `{name}` has already been defined")]
    #[diagnostic(
        code(sprig::config::duplicate_name),
        help("Give one of the sprites an explicit `name` option")
    )]
    DuplicateName { name: String },

    #[error("Sprite `{source_path}` has both a :name path segment and a name option")]
    #[diagnostic(code(sprig::config::name_conflict), help("Use only one of them"))]
    NameConflict { source_path: String },

    #[error("Sprite `{source_path} => {target}` requires a :name segment in the sprite path")]
    #[diagnostic(code(sprig::config::missing_name))]
    MissingNameSegment { source_path: String, target: String },

    #[error("The `{name}` sprite wants to use a data URI, but stylesheet output is disabled")]
    #[diagnostic(
        code(sprig::config::data_uri),
        help("Data URI sprites are embedded in the Sass output; enable `sass`")
    )]
    DataUriWithoutStylesheet { name: String },

    #[error("Sprite `{sprite}` has more than one source named `{source_name}`")]
    #[diagnostic(code(sprig::config::duplicate_source))]
    DuplicateSource { sprite: String, source_name: String },

    #[error("Invalid value for `{option}`: {message}")]
    #[diagnostic(code(sprig::config::invalid_option))]
    InvalidOption { option: String, message: String },
}

pub type Result<T> = std::result::Result<T, SprigError>;
