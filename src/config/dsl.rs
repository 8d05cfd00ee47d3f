//! Line-oriented config front-end (`.sprig`).
//!
//! ```text
//! # Global options
//! config.padding 10
//! config.url "/assets/:filename"
//! config.css false
//!
//! # Sprites
//! sprites "sources/:name/*" => "public/images/:name.png"
//! sprite "sources/icons" => data_uri, padding: false
//! sprite "sources/logos" => :data_uri, :padding => 0
//! ```
//!
//! Every statement fits on one line. Anything after a line reading
//! `__END__` is ignored.

use std::path::Path;

use crate::error::{SprigError, Result};

use super::directive::{GlobalOption, RawConfig, Scalar, SpriteDirective, SpriteOptions, Target};

const END_MARKER: &str = "__END__";
const CONFIG_PREFIX: &str = "config.";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Int(i64),
    Word(String),
    Arrow,
    Comma,
    Colon,
    Equals,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Str(s) => format!("\"{}\"", s),
            Token::Int(n) => n.to_string(),
            Token::Word(w) => format!("`{}`", w),
            Token::Arrow => "`=>`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Equals => "`=`".to_string(),
        }
    }
}

/// Parse a DSL config into directives. Relative paths resolve against `root`.
pub fn parse(content: &str, root: &Path) -> Result<RawConfig> {
    let mut config = RawConfig::new(root);

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        if line.trim_end() == END_MARKER {
            break;
        }

        let tokens = tokenize(line).map_err(|message| syntax_error(number, message))?;
        let Some((first, rest)) = tokens.split_first() else {
            continue;
        };

        config = match first {
            Token::Word(word) if word.starts_with(CONFIG_PREFIX) => {
                let name = &word[CONFIG_PREFIX.len()..];
                let value = parse_global(rest).map_err(|message| syntax_error(number, message))?;
                config.global(GlobalOption::parse(name, value)?)
            }
            Token::Word(word) if word == "sprite" || word == "sprites" => {
                let sprite = parse_sprite(rest, number)?;
                config.sprite(sprite)
            }
            other => {
                return Err(syntax_error(
                    number,
                    format!("expected `sprite` or `config.<option>`, found {}", other.describe()),
                ))
            }
        };
    }

    Ok(config)
}

fn syntax_error(line: usize, message: String) -> SprigError {
    SprigError::Parse {
        message: format!("line {}: {}", line, message),
        help: None,
    }
}

/// `config.<option> [=] <value>`
fn parse_global(tokens: &[Token]) -> std::result::Result<Scalar, String> {
    let tokens = match tokens.split_first() {
        Some((Token::Equals, rest)) => rest,
        _ => tokens,
    };

    match tokens {
        [value] => scalar(value),
        [] => Err("missing value".to_string()),
        [_, extra, ..] => Err(format!("unexpected {} after value", extra.describe())),
    }
}

/// `"<source>" => <destination>[, key: value]...`
///
/// Pairs may come in any order; the resolver rejects declarations without
/// exactly one mapping.
fn parse_sprite(tokens: &[Token], line: usize) -> Result<SpriteDirective> {
    let mut directive = SpriteDirective::default();

    for pair in tokens.split(|t| *t == Token::Comma) {
        match pair {
            // `=> :data_uri`
            [Token::Str(source), Token::Arrow, Token::Colon, Token::Word(word)] if word == Target::DATA_URI => {
                directive.mappings.push((source.clone(), Target::DataUri));
            }
            [Token::Str(source), Token::Arrow, destination] => {
                let target = match destination {
                    Token::Str(path) => Target::parse(path),
                    Token::Word(word) if word == Target::DATA_URI => Target::DataUri,
                    other => {
                        return Err(syntax_error(
                            line,
                            format!("expected a destination path or `data_uri`, found {}", other.describe()),
                        ))
                    }
                };
                directive.mappings.push((source.clone(), target));
            }
            // `padding: 0` or `:padding => 0`
            [Token::Word(key), Token::Colon, value] | [Token::Colon, Token::Word(key), Token::Arrow, value] => {
                if !SpriteOptions::is_option(key) {
                    return Err(syntax_error(
                        line,
                        format!(
                            "unknown sprite option `{}`, expected one of {}",
                            key,
                            SpriteOptions::NAMES.join(", ")
                        ),
                    ));
                }
                let value = scalar(value).map_err(|message| syntax_error(line, message))?;
                directive.options.set(key, value)?;
            }
            [] => return Err(syntax_error(line, "empty sprite declaration".to_string())),
            other => {
                let found: Vec<String> = other.iter().map(Token::describe).collect();
                return Err(syntax_error(
                    line,
                    format!("expected `\"source\" => \"destination\"` or `key: value`, found {}", found.join(" ")),
                ));
            }
        }
    }

    Ok(directive)
}

fn scalar(token: &Token) -> std::result::Result<Scalar, String> {
    match token {
        Token::Str(s) => Ok(Scalar::String(s.clone())),
        Token::Int(n) => Ok(Scalar::Integer(*n)),
        Token::Word(w) if w == "true" => Ok(Scalar::Bool(true)),
        Token::Word(w) if w == "false" || w == "nil" => Ok(Scalar::Bool(false)),
        Token::Word(w) if w == Target::DATA_URI => Ok(Scalar::String(w.clone())),
        other => Err(format!("expected a value, found {}", other.describe())),
    }
}

fn tokenize(line: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '#' => break,
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' | '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err("unterminated string".to_string()),
                        },
                        Some(ch) => value.push(ch),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                tokens.push(Token::Str(value));
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            ':' => {
                chars.next();
                tokens.push(Token::Colon);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'>') {
                    chars.next();
                    tokens.push(Token::Arrow);
                } else {
                    tokens.push(Token::Equals);
                }
            }
            c if c == '-' || c.is_ascii_digit() => {
                let mut number = String::new();
                number.push(c);
                chars.next();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    number.push(d);
                    chars.next();
                }
                let value = number
                    .parse()
                    .map_err(|_| format!("invalid number `{}`", number))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if !(w.is_alphanumeric() || w == '_' || w == '.') {
                        break;
                    }
                    word.push(w);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
            other => return Err(format!("unexpected character `{}`", other)),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::directive::{Directive, PathSetting};
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;

    fn parse_str(content: &str) -> Result<RawConfig> {
        parse(content, Path::new("/project"))
    }

    fn parse_message(content: &str) -> String {
        match parse_str(content) {
            Err(SprigError::Parse { message, .. }) => message,
            other => panic!("expected a parse error, got {:?}", other.map(|c| c.directives)),
        }
    }

    #[test]
    fn test_parse_statements() {
        let config = parse_str(
            r#"
# Global options
config.padding 10
config.css false
config.url = "/assets/:filename"

sprites "sources/:name/*" => "public/images/:name.png"
sprite "sources/icons" => data_uri, padding: false, name: "icons"
"#,
        )
        .unwrap();

        assert_eq!(
            config.directives,
            vec![
                Directive::Global(GlobalOption::Padding(10)),
                Directive::Global(GlobalOption::Css(PathSetting::Disabled)),
                Directive::Global(GlobalOption::Url("/assets/:filename".to_string())),
                Directive::Sprite(SpriteDirective::new(
                    "sources/:name/*",
                    Target::Path("public/images/:name.png".to_string())
                )),
                Directive::Sprite(
                    SpriteDirective::new("sources/icons", Target::DataUri)
                        .padding(0)
                        .name("icons")
                ),
            ]
        );
    }

    #[test]
    fn test_symbol_style_options() {
        let config = parse_str("sprite 'sources/fry/*' => 'fry.png', :padding => 4").unwrap();
        let sprite = config.sprites().next().unwrap();

        assert_eq!(sprite.options.padding, Some(4));
    }

    #[test]
    fn test_symbol_style_data_uri() {
        let config = parse_str("sprite 'sources/icons/*' => :data_uri, :name => 'icons'").unwrap();
        let sprite = config.sprites().next().unwrap();

        assert_eq!(sprite.mappings, vec![("sources/icons/*".to_string(), Target::DataUri)]);
        assert_eq!(sprite.options.name.as_deref(), Some("icons"));
    }

    #[test]
    fn test_comments_and_end_marker() {
        let config = parse_str(
            "sprite \"a/#1/*\" => \"a.png\" # trailing\n__END__\nthis is not parsed\n",
        )
        .unwrap();

        assert_eq!(config.directives.len(), 1);
        assert_eq!(config.sprites().next().unwrap().mappings[0].0, "a/#1/*");
    }

    #[test]
    fn test_options_without_mapping() {
        let config = parse_str("sprite name: \"lonely\"").unwrap();
        assert!(config.sprites().next().unwrap().mappings.is_empty());
    }

    #[test]
    fn test_two_mappings_are_kept_for_the_resolver() {
        let config = parse_str("sprite \"a/*\" => \"a.png\", \"b/*\" => \"b.png\"").unwrap();
        assert_eq!(config.sprites().next().unwrap().mappings.len(), 2);
    }

    #[test]
    fn test_errors_report_line_numbers() {
        assert_eq!(
            parse_message("config.padding 1\n\nspirte \"a\" => \"b\""),
            "line 3: expected `sprite` or `config.<option>`, found `spirte`"
        );
        assert!(parse_message("sprite \"a => \"b\"").starts_with("line 1: "));
        assert!(parse_message("config.padding").contains("missing value"));
        assert!(parse_message("sprite \"a\" => \"b\", colour: 1").contains("unknown sprite option"));
    }

    #[test]
    fn test_invalid_option_value() {
        let err = parse_str("config.padding -3").unwrap_err();
        assert!(matches!(
            err,
            SprigError::Config(ConfigError::InvalidOption { .. })
        ));
    }
}
