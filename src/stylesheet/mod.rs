//! Stylesheet generation.
//!
//! Positions come from the project layout, so the stylesheet always describes
//! every sprite, not only the ones rebuilt in this run.

pub mod css;
pub mod sass;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, SprigError};
use crate::render::ProjectLayout;
use crate::types::Project;

pub use css::{background_statement, position_statement, Offset};

pub const SASS_FILENAME: &str = "_sprig.sass";
pub const CSS_FILENAME: &str = "sprig.css";

pub(crate) const HEADER_SASS: &str = "// Generated by sprig. Changes will be overwritten.\n";
pub(crate) const HEADER_CSS: &str = "/* Generated by sprig. Changes will be overwritten. */\n";
pub(crate) const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// The Sass file to write: the configured path if it names a `.sass` file,
/// otherwise `_sprig.sass` inside it.
pub fn sass_output_path(configured: &Path) -> PathBuf {
    output_path(configured, "sass", SASS_FILENAME)
}

/// The CSS file to write: the configured path if it names a `.css` file,
/// otherwise `sprig.css` inside it.
pub fn css_output_path(configured: &Path) -> PathBuf {
    output_path(configured, "css", CSS_FILENAME)
}

fn output_path(configured: &Path, extension: &str, filename: &str) -> PathBuf {
    if configured.extension().is_some_and(|e| e == extension) {
        configured.to_path_buf()
    } else {
        configured.join(filename)
    }
}

/// Base64 payloads embedded in the project's current Sass output.
pub fn existing_payloads(project: &Project) -> HashMap<String, String> {
    let Some(sass) = &project.settings.sass else {
        return HashMap::new();
    };

    match fs::read_to_string(sass_output_path(sass)) {
        Ok(content) => sass::existing_payloads(&content),
        Err(_) => HashMap::new(),
    }
}

/// Payloads for every data URI sprite.
///
/// `rendered` maps sprite names to freshly composed images. Sprites without
/// a fresh image keep the payload from the previous stylesheet.
pub fn collect_payloads(
    project: &Project,
    rendered: &HashMap<String, PathBuf>,
) -> Result<HashMap<String, String>> {
    let mut payloads = existing_payloads(project);
    payloads.retain(|name, _| project.sprite(name).is_some_and(|s| s.is_data_uri()));

    for sprite in project.data_uri_sprites() {
        let Some(path) = rendered.get(&sprite.name) else {
            continue;
        };
        if !path.exists() {
            continue;
        }
        let bytes = fs::read(path).map_err(|e| SprigError::Io {
            path: path.clone(),
            message: format!("Failed to read rendered sprite: {}", e),
        })?;
        payloads.insert(sprite.name.clone(), STANDARD.encode(bytes));
    }

    Ok(payloads)
}

/// Write the Sass stylesheet. Returns `false` when Sass output is disabled.
pub fn generate_sass(layout: &ProjectLayout<'_>, payloads: &HashMap<String, String>) -> Result<bool> {
    let Some(configured) = &layout.project().settings.sass else {
        return Ok(false);
    };

    let path = sass_output_path(configured);
    write_stylesheet(&path, &sass::render(layout, payloads))?;
    debug!(path = ?path, "wrote sass");
    Ok(true)
}

/// Write the CSS stylesheet. Returns `false` when CSS output is disabled.
pub fn generate_css(layout: &ProjectLayout<'_>, payloads: &HashMap<String, String>) -> Result<bool> {
    let Some(configured) = &layout.project().settings.css else {
        return Ok(false);
    };

    let path = css_output_path(configured);
    write_stylesheet(&path, &css::render(layout, payloads))?;
    debug!(path = ?path, "wrote css");
    Ok(true)
}

/// Replace a stylesheet in one step, so readers never see a partial file.
fn write_stylesheet(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let not_writable = |e: std::io::Error| SprigError::TargetNotWritable {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    fs::create_dir_all(dir).map_err(not_writable)?;
    let mut file = NamedTempFile::new_in(dir).map_err(not_writable)?;
    file.write_all(content.as_bytes()).map_err(not_writable)?;
    file.persist(path).map_err(|e| not_writable(e.error))?;

    Ok(())
}
