//! Init command implementation.
//!
//! Writes a starter config and, unless asked not to, a pair of example
//! source images so that `sprig build` works straight away.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use clap::Args;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::config::CONFIG_FILENAMES;
use crate::error::{Result, SprigError};
use crate::output::{display_path, Printer};
use crate::render::write_png;

const EXAMPLE_SPRITE: &str = "example";

/// Example sources: file name, size and colour.
const EXAMPLES: [(&str, u32, u32, [u8; 4]); 2] = [
    ("one.png", 16, 16, [231, 76, 60, 255]),
    ("two.png", 24, 16, [52, 152, 219, 255]),
];

/// Create a sprig config in a directory
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialise (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Where composed sprites are written
    #[arg(long, value_name = "DIR", default_value = "public/images")]
    pub sprites: String,

    /// Where source images live, one directory per sprite
    #[arg(long, value_name = "DIR", default_value = "sources")]
    pub sources: String,

    /// Write sprig.yaml instead of .sprig
    #[arg(long)]
    pub yaml: bool,

    /// Don't create example source images
    #[arg(long)]
    pub no_examples: bool,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    if !args.force {
        if let Some(existing) = CONFIG_FILENAMES
            .iter()
            .map(|name| args.path.join(name))
            .find(|path| path.exists())
        {
            return Err(SprigError::ConfigExists { path: existing });
        }
    }

    let sources = args.sources.trim_end_matches('/');
    let sprites = args.sprites.trim_end_matches('/');
    let (filename, content) = if args.yaml {
        ("sprig.yaml", yaml_config(sources, sprites))
    } else {
        (".sprig", dsl_config(sources, sprites))
    };

    let config_path = args.path.join(filename);
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| SprigError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }
    fs::write(&config_path, content).map_err(|e| SprigError::Io {
        path: config_path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;
    printer.success("Created", &display_path(&config_path));

    if !args.no_examples {
        let dir = args.path.join(sources).join(EXAMPLE_SPRITE);
        write_examples(&dir, printer)?;
    }

    Ok(())
}

fn dsl_config(sources: &str, sprites: &str) -> String {
    format!(
        "# sprig configuration\n\
         #\n\
         # config.sass \"public/stylesheets/sass\"\n\
         # config.css false\n\
         # config.padding 20\n\
         # config.url \"/images/:filename\"\n\
         \n\
         sprites \"{sources}/:name/*\" => \"{sprites}/:name.png\"\n"
    )
}

fn yaml_config(sources: &str, sprites: &str) -> String {
    format!(
        "# sprig configuration\n\
         config:\n  \
           sass: public/stylesheets/sass\n  \
           css: false\n  \
           padding: 20\n  \
           url: \"/images/:filename\"\n\
         \n\
         sprites:\n  \
           - \"{sources}/:name/*\": \"{sprites}/:name.png\"\n"
    )
}

fn write_examples(dir: &Path, printer: &Printer) -> Result<()> {
    for (name, width, height, colour) in EXAMPLES {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(colour)))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| SprigError::Io {
                path: path.clone(),
                message: format!("Failed to encode example image: {}", e),
            })?;
        write_png(&bytes, &path)?;
        printer.status("Created", &display_path(&path));
    }

    Ok(())
}
