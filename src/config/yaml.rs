//! YAML config front-end (`sprig.yaml`).
//!
//! ```yaml
//! config:
//!   padding: 10
//!   sass: public/stylesheets/sass
//!
//! sprites:
//!   - "sources/:name/*": "public/images/:name.png"
//!   - "sources/icons": data_uri
//!     padding: false
//! ```

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{SprigError, Result};

use super::directive::{GlobalOption, RawConfig, Scalar, SpriteDirective, SpriteOptions, Target};

/// Parse a YAML config into directives. Relative paths resolve against `root`.
pub fn parse(content: &str, root: &Path) -> Result<RawConfig> {
    let document: Value = serde_yaml::from_str(content).map_err(|e| SprigError::Parse {
        message: format!("Invalid YAML config: {}", e),
        help: None,
    })?;

    let mut config = RawConfig::new(root);

    let mapping = match document {
        Value::Null => return Ok(config),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(SprigError::Parse {
                message: "Config must be a YAML mapping".to_string(),
                help: Some("Use top-level `config:` and `sprites:` keys".to_string()),
            })
        }
    };

    for (key, value) in mapping {
        match key.as_str() {
            Some("config") => {
                for option in parse_globals(value)? {
                    config = config.global(option);
                }
            }
            Some("sprites") => {
                for sprite in parse_sprites(value)? {
                    config = config.sprite(sprite);
                }
            }
            _ => {
                return Err(SprigError::Parse {
                    message: format!("Unexpected top-level key {}", describe(&key)),
                    help: Some("Only `config` and `sprites` are allowed".to_string()),
                })
            }
        }
    }

    Ok(config)
}

fn parse_globals(value: Value) -> Result<Vec<GlobalOption>> {
    let mapping = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(SprigError::Parse {
                message: format!("`config` must be a mapping, found {}", describe(&other)),
                help: None,
            })
        }
    };

    let mut options = Vec::new();
    for (key, value) in mapping {
        let name = key_string(&key)?;
        options.push(GlobalOption::parse(&name, scalar(&name, value)?)?);
    }
    Ok(options)
}

fn parse_sprites(value: Value) -> Result<Vec<SpriteDirective>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        // A single sprite may be written without the list.
        Value::Mapping(mapping) => return Ok(vec![parse_sprite(mapping)?]),
        other => {
            return Err(SprigError::Parse {
                message: format!("`sprites` must be a list, found {}", describe(&other)),
                help: None,
            })
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Mapping(mapping) => parse_sprite(mapping),
            other => Err(SprigError::Parse {
                message: format!("Each sprite must be a mapping, found {}", describe(&other)),
                help: Some("Write sprites as `- \"sources/*\": \"public/sprite.png\"`".to_string()),
            }),
        })
        .collect()
}

fn parse_sprite(mapping: Mapping) -> Result<SpriteDirective> {
    let mut directive = SpriteDirective::default();

    for (key, value) in mapping {
        let key = key_string(&key)?;
        let value = scalar(&key, value)?;

        if SpriteOptions::is_option(&key) {
            directive.options.set(&key, value)?;
            continue;
        }

        let target = match value {
            Scalar::String(destination) => Target::parse(&destination),
            other => {
                return Err(SprigError::Parse {
                    message: format!("Destination of `{}` must be a path, found {}", key, other),
                    help: Some(format!("Use a path or `{}`", Target::DATA_URI)),
                })
            }
        };
        directive.mappings.push((key, target));
    }

    Ok(directive)
}

fn key_string(key: &Value) -> Result<String> {
    key.as_str().map(str::to_string).ok_or_else(|| SprigError::Parse {
        message: format!("Expected a string key, found {}", describe(key)),
        help: None,
    })
}

fn scalar(key: &str, value: Value) -> Result<Scalar> {
    match value {
        Value::String(s) => Ok(Scalar::String(s)),
        Value::Bool(b) => Ok(Scalar::Bool(b)),
        Value::Number(n) => n.as_i64().map(Scalar::Integer).ok_or_else(|| SprigError::Parse {
            message: format!("Value of `{}` must be a whole number, found {}", key, n),
            help: None,
        }),
        other => Err(SprigError::Parse {
            message: format!("Value of `{}` must be a string, number or boolean, found {}", key, describe(&other)),
            help: None,
        }),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("`{}`", s),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(_) => "a tagged value".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::directive::{Directive, PathSetting};
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;

    fn root() -> &'static Path {
        Path::new("/project")
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
config:
  padding: 10
  sass: false
  url: "/assets/:filename"

sprites:
  - "sources/:name/*": "public/images/:name.png"
  - "sources/icons": data_uri
    name: icons
    padding: false
"#,
            root(),
        )
        .unwrap();

        assert_eq!(
            config.directives,
            vec![
                Directive::Global(GlobalOption::Padding(10)),
                Directive::Global(GlobalOption::Sass(PathSetting::Disabled)),
                Directive::Global(GlobalOption::Url("/assets/:filename".to_string())),
                Directive::Sprite(SpriteDirective::new(
                    "sources/:name/*",
                    Target::Path("public/images/:name.png".to_string())
                )),
                Directive::Sprite(
                    SpriteDirective::new("sources/icons", Target::DataUri)
                        .name("icons")
                        .padding(0)
                ),
            ]
        );
        assert_eq!(config.root, root());
    }

    #[test]
    fn test_sprites_before_config_keep_order() {
        let config = parse(
            "sprites:\n  - \"a/*\": \"a.png\"\nconfig:\n  padding: 4\n",
            root(),
        )
        .unwrap();

        assert!(matches!(config.directives[0], Directive::Sprite(_)));
        assert!(matches!(
            config.directives[1],
            Directive::Global(GlobalOption::Padding(4))
        ));
    }

    #[test]
    fn test_option_before_mapping() {
        let config = parse("sprites:\n  - padding: 2\n    \"a/*\": \"a.png\"\n", root()).unwrap();
        let sprite = config.sprites().next().unwrap();

        assert_eq!(sprite.options.padding, Some(2));
        assert_eq!(sprite.mappings.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let config = parse("", root()).unwrap();
        assert!(config.directives.is_empty());
    }

    #[test]
    fn test_missing_mapping_reaches_resolver() {
        let config = parse("sprites:\n  - name: lonely\n", root()).unwrap();
        let sprite = config.sprites().next().unwrap();

        assert!(sprite.mappings.is_empty());
        assert_eq!(sprite.options.name.as_deref(), Some("lonely"));
    }

    #[test]
    fn test_invalid_option_value() {
        let err = parse("config:\n  padding: lots\n", root()).unwrap_err();
        assert!(matches!(
            err,
            SprigError::Config(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_unknown_top_level_key() {
        let err = parse("sprite:\n  - \"a\": \"b\"\n", root()).unwrap_err();
        assert!(matches!(err, SprigError::Parse { .. }));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse("config: [unclosed", root()).unwrap_err();
        assert!(matches!(err, SprigError::Parse { .. }));
    }
}
