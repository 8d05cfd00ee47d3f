//! Lossless PNG re-compression via oxipng.

use std::fs;
use std::io::Write;
use std::path::Path;

use oxipng::{optimize_from_memory, Options};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{SprigError, Result};

use super::Optimiser;

/// Optimises PNG files with oxipng.
///
/// The file is only replaced when the optimised output is smaller, and the
/// replacement is written to a temporary file and renamed into place, so a
/// failure never leaves a truncated image behind.
#[derive(Debug, Clone)]
pub struct PngOptimiser {
    level: u8,
}

impl PngOptimiser {
    pub fn new() -> Self {
        Self { level: 2 }
    }
}

impl Default for PngOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimiser for PngOptimiser {
    fn optimise(&self, path: &Path) -> Result<u64> {
        let error = |message: String| SprigError::Optimise {
            path: path.to_path_buf(),
            message,
        };

        let original = fs::read(path).map_err(|e| error(e.to_string()))?;
        let optimised = optimize_from_memory(&original, &Options::from_preset(self.level))
            .map_err(|e| error(e.to_string()))?;

        if optimised.len() >= original.len() {
            debug!(path = ?path, "no savings");
            return Ok(0);
        }

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| error(e.to_string()))?;
        tmp.write_all(&optimised).map_err(|e| error(e.to_string()))?;
        tmp.persist(path).map_err(|e| error(e.error.to_string()))?;

        let saved = (original.len() - optimised.len()) as u64;
        debug!(path = ?path, saved, "optimised");
        Ok(saved)
    }
}
