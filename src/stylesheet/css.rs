//! Plain CSS statements and the optional `.css` output.

use std::collections::HashMap;
use std::fmt::Write;

use crate::render::{Position, ProjectLayout};

/// Horizontal and vertical adjustments applied on top of a stored position.
///
/// The vertical adjustment is added after the stored offset is negated, so
/// `-10` moves the background up by another ten pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

impl Offset {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The `background-position` pair for a source at `position`.
    pub fn apply(&self, position: &Position) -> (i64, i64) {
        (
            i64::from(position.x) + self.x,
            -i64::from(position.y) + self.y,
        )
    }
}

/// `background: url(<url>) <x>px <y>px no-repeat`
pub fn background_statement(url: &str, position: &Position, offset: Offset) -> String {
    let (x, y) = offset.apply(position);
    format!("background: url({}) {}px {}px no-repeat", url, x, y)
}

/// `background-position: <x>px <y>px`
pub fn position_statement(position: &Position, offset: Offset) -> String {
    let (x, y) = offset.apply(position);
    format!("background-position: {}px {}px", x, y)
}

/// CSS class for a source: `.<sprite>-<source>`.
pub fn class_name(sprite: &str, source: &str) -> String {
    format!(".{}-{}", sprite, source)
}

/// Render the CSS document: one class per source.
///
/// Data URI sprites share one rule carrying the image, so the payload is
/// only written once per sprite.
pub fn render(layout: &ProjectLayout<'_>, payloads: &HashMap<String, String>) -> String {
    let mut out = String::from(super::HEADER_CSS);

    for (sprite, sprite_layout) in layout.iter() {
        if sprite.is_empty() {
            continue;
        }

        out.push('\n');
        let classes: Vec<String> = sprite
            .sources
            .iter()
            .map(|source| class_name(&sprite.name, &source.name))
            .collect();

        match (&sprite.url, payloads.get(&sprite.name)) {
            (Some(url), _) => {
                for (class, position) in classes.iter().zip(&sprite_layout.positions) {
                    let _ = writeln!(
                        out,
                        "{} {{ {}; }}",
                        class,
                        background_statement(url, position, Offset::default())
                    );
                }
            }
            (None, payload) => {
                let image = match payload {
                    Some(data) => format!("background: url({}{}) no-repeat", super::DATA_URI_PREFIX, data),
                    None => "background-repeat: no-repeat".to_string(),
                };
                let _ = writeln!(out, "{} {{ {}; }}", classes.join(", "), image);
                for (class, position) in classes.iter().zip(&sprite_layout.positions) {
                    let _ = writeln!(
                        out,
                        "{} {{ {}; }}",
                        class,
                        position_statement(position, Offset::default())
                    );
                }
            }
        }
    }

    out
}
