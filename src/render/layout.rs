//! Sprite layout.
//!
//! Sources are stacked in a single column, top to bottom, in declaration
//! order, separated by the sprite's padding. Every source sits at `x = 0`.
//! There is no packing: offsets stay predictable for hand-written CSS at the
//! cost of some canvas area when source widths vary.

use crate::types::{Project, Sprite};

/// A source's placement within a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Placement of every source in a sprite, plus the canvas size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub positions: Vec<Position>,
    pub width: u32,
    pub height: u32,
}

impl Layout {
    /// Stack sources of the given `(width, height)` sizes vertically.
    ///
    /// Returns `None` when the stack is taller than `u32::MAX` pixels.
    pub fn stack(sizes: &[(u32, u32)], padding: u32) -> Option<Self> {
        let mut positions = Vec::with_capacity(sizes.len());
        let mut cursor_y: u32 = 0;
        let mut width: u32 = 0;

        for (i, &(w, h)) in sizes.iter().enumerate() {
            if i > 0 {
                cursor_y = cursor_y.checked_add(padding)?;
            }

            positions.push(Position {
                x: 0,
                y: cursor_y,
                width: w,
                height: h,
            });

            cursor_y = cursor_y.checked_add(h)?;
            width = width.max(w);
        }

        Some(Self {
            positions,
            width,
            height: cursor_y,
        })
    }

    pub fn get(&self, index: usize) -> Option<&Position> {
        self.positions.get(index)
    }

    pub fn canvas(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Layouts for every sprite in a project, in project order.
#[derive(Debug)]
pub struct ProjectLayout<'a> {
    project: &'a Project,
    layouts: Vec<Layout>,
}

impl<'a> ProjectLayout<'a> {
    /// Pair each sprite with its layout. `layouts` must be in project order.
    pub fn new(project: &'a Project, layouts: Vec<Layout>) -> Self {
        debug_assert_eq!(project.sprites.len(), layouts.len());
        Self { project, layouts }
    }

    pub fn project(&self) -> &'a Project {
        self.project
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Sprite, &Layout)> {
        self.project.sprites.iter().zip(self.layouts.iter())
    }
}
