//! Sass mixin generation.
//!
//! The document defines two mixins which dispatch on a `sprite/source` key:
//!
//! ```sass
//! +sprig("fry/two")                       // full background
//! +sprig-position("fry/two", 0px, -10px)  // position only, shifted up 10px
//! ```
//!
//! Data URI sprites get a `.<sprite>_data` class holding the inlined image,
//! which the full background mixin extends.

use std::collections::HashMap;
use std::fmt::Write;

use crate::render::{Position, ProjectLayout};
use crate::types::Sprite;

use super::DATA_URI_PREFIX;

pub const MIXIN: &str = "sprig";
pub const POSITION_MIXIN: &str = "sprig-position";

/// Render the Sass document.
pub fn render(layout: &ProjectLayout<'_>, payloads: &HashMap<String, String>) -> String {
    let mut out = String::from(super::HEADER_SASS);

    for sprite in layout.project().data_uri_sprites() {
        if sprite.is_empty() {
            continue;
        }
        out.push('\n');
        let _ = writeln!(out, ".{}", sprite.data_class());
        match payloads.get(&sprite.name) {
            Some(data) => {
                let _ = writeln!(out, "  background: url({}{}) no-repeat", DATA_URI_PREFIX, data);
            }
            None => out.push_str("  background-repeat: no-repeat\n"),
        }
    }

    out.push('\n');
    write_mixin(&mut out, MIXIN, layout, |sprite, position| match &sprite.url {
        Some(url) => vec![format!(
            "background: url({}) {} no-repeat",
            url,
            offsets(position)
        )],
        None => vec![
            format!("@extend .{}", sprite.data_class()),
            format!("background-position: {}", offsets(position)),
        ],
    });

    out.push('\n');
    write_mixin(&mut out, POSITION_MIXIN, layout, |_, position| {
        vec![format!("background-position: {}", offsets(position))]
    });

    out
}

fn write_mixin<F>(out: &mut String, name: &str, layout: &ProjectLayout<'_>, rules: F)
where
    F: Fn(&Sprite, &Position) -> Vec<String>,
{
    let _ = writeln!(out, "={}($source, $x-offset: 0px, $y-offset: 0px)", name);

    let mut first = true;
    for (sprite, sprite_layout) in layout.iter() {
        for (source, position) in sprite.sources.iter().zip(&sprite_layout.positions) {
            let keyword = if first { "@if" } else { "@else if" };
            first = false;

            let _ = writeln!(out, "  {} $source == \"{}\"", keyword, sprite.key_for(source));
            for rule in rules(sprite, position) {
                let _ = writeln!(out, "    {}", rule);
            }
        }
    }

    if first {
        let _ = writeln!(out, "  @warn \"{}: no sprites are defined\"", MIXIN);
    } else {
        out.push_str("  @else\n");
        let _ = writeln!(out, "    @warn \"{}: unknown source #{{$source}}\"", MIXIN);
    }
}

/// `(<x>px + $x-offset) (<y>px + $y-offset)`
fn offsets(position: &Position) -> String {
    format!(
        "({}px + $x-offset) ({}px + $y-offset)",
        position.x,
        -i64::from(position.y)
    )
}

/// Payloads embedded in a previously generated document, keyed by sprite name.
pub fn existing_payloads(content: &str) -> HashMap<String, String> {
    let mut payloads = HashMap::new();
    let mut current: Option<&str> = None;

    for line in content.lines() {
        if let Some(class) = line.strip_prefix('.') {
            current = class.trim_end().strip_suffix("_data");
            continue;
        }

        let Some(sprite) = current.take() else {
            continue;
        };
        let payload = line
            .trim()
            .strip_prefix("background: url(")
            .and_then(|rest| rest.strip_prefix(DATA_URI_PREFIX))
            .and_then(|rest| rest.split_once(')'))
            .map(|(data, _)| data);

        if let Some(data) = payload {
            payloads.insert(sprite.to_string(), data.to_string());
        }
    }

    payloads
}
