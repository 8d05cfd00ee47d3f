//! Turns a [`RawConfig`] into a [`Project`].
//!
//! Resolution happens in two passes. First every global option is folded
//! into the project settings, whatever its position in the file. Then each
//! sprite directive is expanded into concrete definitions (one per matching
//! directory for `:name` patterns), and finally every definition is
//! materialised into a [`Sprite`] using the final settings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::types::{Project, ProjectSettings, SaveTarget, Source, Sprite};

use super::directive::{GlobalOption, PathSetting, RawConfig, SpriteDirective, SpriteOptions, Target};
use super::glob;
use super::{DEFAULT_CACHE, DEFAULT_CSS, DEFAULT_PADDING, DEFAULT_SASS, DEFAULT_URL};

/// The placeholder which expands a pattern into one sprite per directory.
pub const NAME_SEGMENT: &str = ":name";

/// A sprite after expansion, before global settings are applied.
#[derive(Debug)]
struct Definition {
    name: String,
    sources: Vec<Source>,
    target: SaveTarget,
    options: SpriteOptions,
}

/// Resolve a raw config into a project.
pub fn resolve(config: &RawConfig) -> Result<Project> {
    let settings = resolve_settings(config);

    let mut definitions: Vec<Definition> = Vec::new();
    for directive in config.sprites() {
        for definition in expand_directive(&config.root, directive)? {
            if definitions.iter().any(|d| d.name == definition.name) {
                return Err(ConfigError::DuplicateName {
                    name: definition.name,
                }
                .into());
            }
            definitions.push(definition);
        }
    }

    let sprites = definitions
        .into_iter()
        .map(|definition| materialise(definition, &settings))
        .collect::<Result<Vec<_>>>()?;

    debug!(root = ?config.root, sprites = sprites.len(), "resolved project");

    Ok(Project {
        root: config.root.clone(),
        config_path: config.config_path.clone(),
        settings,
        sprites,
    })
}

/// Fold every global option into the project settings. Later declarations win.
fn resolve_settings(config: &RawConfig) -> ProjectSettings {
    let root = &config.root;
    let mut padding = DEFAULT_PADDING;
    let mut url = DEFAULT_URL.to_string();
    let mut sass = PathSetting::Path(DEFAULT_SASS.to_string());
    let mut css = DEFAULT_CSS;
    let mut cache = PathSetting::Path(DEFAULT_CACHE.to_string());

    for option in config.globals() {
        match option {
            GlobalOption::Padding(value) => padding = *value,
            GlobalOption::Url(value) => url = value.clone(),
            GlobalOption::Sass(value) => sass = value.clone(),
            GlobalOption::Css(value) => css = value.clone(),
            GlobalOption::Cache(value) => cache = value.clone(),
        }
    }

    let to_path = |setting: PathSetting| match setting {
        PathSetting::Path(path) => Some(root.join(path)),
        PathSetting::Disabled => None,
    };

    ProjectSettings {
        padding,
        url,
        sass: to_path(sass),
        css: to_path(css),
        cache: to_path(cache),
    }
}

fn expand_directive(root: &Path, directive: &SpriteDirective) -> Result<Vec<Definition>> {
    let (source, target) = match directive.mappings.as_slice() {
        [] => return Err(ConfigError::MissingMapping.into()),
        [(source, target)] => (source, target),
        many => {
            let sources: Vec<&str> = many.iter().map(|(s, _)| s.as_str()).collect();
            return Err(ConfigError::MultipleMappings {
                sources: sources.join(", "),
            }
            .into());
        }
    };

    if !source.contains(NAME_SEGMENT) {
        return Ok(vec![define(root, source, target, &directive.options)?]);
    }

    if directive.options.name.is_some() {
        return Err(ConfigError::NameConflict {
            source_path: source.clone(),
        }
        .into());
    }

    if let Target::Path(path) = target {
        if !path.contains(NAME_SEGMENT) {
            return Err(ConfigError::MissingNameSegment {
                source_path: source.clone(),
                target: path.clone(),
            }
            .into());
        }
    }

    expand_named(root, source, target, &directive.options)
}

/// Expand a `:name` pattern into one definition per matching directory.
///
/// The `:name` segment may be part of a longer segment (`icons-:name`); the
/// rest of that segment must match literally and is not part of the name.
fn expand_named(
    root: &Path,
    source: &str,
    target: &Target,
    options: &SpriteOptions,
) -> Result<Vec<Definition>> {
    let (leading, trailing) = source.split_once(NAME_SEGMENT).unwrap_or((source, ""));
    let (dir, prefix) = leading.rsplit_once('/').unwrap_or(("", leading));
    let (suffix, rest) = trailing.split_once('/').unwrap_or((trailing, ""));

    let pattern = root.join(dir).join(format!("{}*{}", prefix, suffix));

    let mut definitions = Vec::new();
    for entry in glob::expand(&pattern) {
        if !entry.is_dir() {
            continue;
        }

        let Some(base) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let name = base
            .strip_prefix(prefix)
            .and_then(|n| n.strip_suffix(suffix))
            .unwrap_or(base.as_str())
            .to_string();
        if name.is_empty() {
            continue;
        }

        let source_path = if rest.is_empty() {
            entry.to_string_lossy().into_owned()
        } else {
            format!("{}/{}", entry.to_string_lossy(), rest)
        };
        let target = match target {
            Target::Path(path) => Target::Path(path.replace(NAME_SEGMENT, &name)),
            Target::DataUri => Target::DataUri,
        };
        let options = SpriteOptions {
            name: Some(name),
            ..options.clone()
        };

        definitions.push(define(root, &source_path, &target, &options)?);
    }

    Ok(definitions)
}

/// Define a single sprite.
fn define(root: &Path, source: &str, target: &Target, options: &SpriteOptions) -> Result<Definition> {
    let target = match target {
        Target::Path(path) => SaveTarget::File(root.join(path)),
        Target::DataUri => SaveTarget::DataUri,
    };

    let name = match (&options.name, &target) {
        (Some(name), _) => name.clone(),
        (None, SaveTarget::File(path)) => file_stem(path),
        (None, SaveTarget::DataUri) => name_from_source(source),
    };

    let sources = collect_sources(&root.join(source));

    let mut seen = HashSet::new();
    for source in &sources {
        if !seen.insert(source.name.as_str()) {
            return Err(ConfigError::DuplicateSource {
                sprite: name,
                source_name: source.name.clone(),
            }
            .into());
        }
    }

    Ok(Definition {
        name,
        sources,
        target,
        options: options.clone(),
    })
}

/// Find source images. A directory means every file directly inside it.
fn collect_sources(pattern: &Path) -> Vec<Source> {
    let pattern = if pattern.is_dir() {
        pattern.join("*")
    } else {
        pattern.to_path_buf()
    };

    glob::expand(&pattern)
        .into_iter()
        .filter(|path| path.is_file())
        .map(Source::new)
        .collect()
}

fn materialise(definition: Definition, settings: &ProjectSettings) -> Result<Sprite> {
    let Definition {
        name,
        sources,
        target,
        options,
    } = definition;

    let url = match &target {
        SaveTarget::DataUri => {
            if settings.sass.is_none() {
                return Err(ConfigError::DataUriWithoutStylesheet { name }.into());
            }
            None
        }
        SaveTarget::File(path) => {
            let template = options.url.as_deref().unwrap_or(&settings.url);
            Some(expand_url(template, &name, path))
        }
    };

    let padding = options.padding.unwrap_or(settings.padding);

    Ok(Sprite::new(name, sources, target, padding, url))
}

/// Substitute `:name` and `:filename` in a URL template.
pub fn expand_url(template: &str, name: &str, save_path: &Path) -> String {
    let filename = save_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    template
        .replace(":filename", &filename)
        .replace(NAME_SEGMENT, name)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name for a data URI sprite without an explicit name: the last literal
/// segment of its source pattern.
fn name_from_source(source: &str) -> String {
    source
        .split('/')
        .filter(|segment| !segment.is_empty() && !glob::is_pattern(segment))
        .last()
        .map(|segment| file_stem(Path::new(segment)))
        .unwrap_or_default()
}
