//! Where is a source? Backs the `position` command.

use crate::error::{Result, SprigError};
use crate::render::{ImageInspector, Position};
use crate::types::{Project, Sprite};

/// A source found within a sprite.
#[derive(Debug, Clone)]
pub struct SourceLocation<'a> {
    pub sprite: &'a Sprite,
    pub source: String,
    pub position: Position,
}

impl SourceLocation<'_> {
    /// The stylesheet key: `sprite/source`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.sprite.name, self.source)
    }
}

/// Locate a source given as `sprite/source`, or as a bare source name
/// matched against every sprite.
pub fn locate<'a>(
    project: &'a Project,
    query: &str,
    inspector: &dyn ImageInspector,
) -> Result<Vec<SourceLocation<'a>>> {
    let (candidates, source): (Vec<&Sprite>, &str) = match query.split_once('/') {
        Some((sprite, source)) => {
            let sprite = project
                .sprite(sprite)
                .ok_or_else(|| SprigError::UnknownSprite {
                    name: sprite.to_string(),
                })?;
            (vec![sprite], source)
        }
        None => (project.sprites.iter().collect(), query),
    };

    let mut found = Vec::new();
    for sprite in candidates {
        let Some(index) = sprite.source_index(source) else {
            continue;
        };
        let layout = sprite.layout(inspector)?;
        if let Some(position) = layout.get(index) {
            found.push(SourceLocation {
                sprite,
                source: source.to_string(),
                position: *position,
            });
        }
    }

    if found.is_empty() {
        return Err(SprigError::UnknownSource {
            name: query.to_string(),
        });
    }

    Ok(found)
}
