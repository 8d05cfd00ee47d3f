//! Position command implementation.
//!
//! Prints where a source sits within its sprite, with the CSS needed to show
//! it. Results go to stdout so they can be piped.

use std::path::Path;

use clap::Args;

use crate::config;
use crate::error::Result;
use crate::output::Printer;
use crate::pipeline::{locate, Backends, SourceLocation};
use crate::stylesheet::{background_statement, position_statement, Offset};

/// Show the position of a source within its sprite
#[derive(Args, Debug)]
pub struct PositionArgs {
    /// Source name, either `source` or `sprite/source`
    pub source: String,

    /// Horizontal adjustment in pixels
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub x: i64,

    /// Vertical adjustment in pixels
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub y: i64,
}

pub fn run(args: PositionArgs, start: &Path, printer: &Printer) -> Result<()> {
    let project = config::load_project(start)?;
    let backends = Backends::new();
    let pipeline = backends.pipeline();

    let offset = Offset::new(args.x, args.y);
    for location in locate(&project, &args.source, pipeline.inspector())? {
        println!("{}", describe(&location, offset, printer));
    }

    Ok(())
}

fn describe(location: &SourceLocation<'_>, offset: Offset, printer: &Printer) -> String {
    let background = match &location.sprite.url {
        Some(url) => background_statement(url, &location.position, offset),
        None => format!(
            "@extend .{} (data URI)",
            location.sprite.data_class()
        ),
    };

    format!(
        "{}: {}px\n  {};\n  {};",
        printer.bold(&location.key()),
        location.position.y,
        background,
        position_statement(&location.position, offset)
    )
}
