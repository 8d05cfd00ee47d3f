//! The `optimise` pipeline: losslessly re-compress arbitrary PNG files.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cache::Cache;
use crate::error::{Result, SprigError};
use crate::types::Project;

use super::Pipeline;

#[derive(Debug, Clone, Default)]
pub struct OptimiseOptions {
    /// Optimise files even if the cache says they already were.
    pub force: bool,
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    Optimised { saved: u64 },
    /// Already optimised and unchanged since.
    Unchanged,
    /// Not a PNG.
    Skipped,
    Failed(SprigError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default)]
pub struct OptimiseReport {
    pub files: Vec<FileReport>,
}

impl OptimiseReport {
    pub fn optimised(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Optimised { .. }))
            .count()
    }

    pub fn bytes_saved(&self) -> u64 {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Optimised { saved } => saved,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome(&self, path: &Path) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.path == path).map(|f| &f.outcome)
    }

    pub fn check(&self) -> Result<()> {
        let failed: Vec<String> = self
            .files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed(_)))
            .map(|f| crate::output::display_path(&f.path))
            .collect();

        if failed.is_empty() {
            return Ok(());
        }

        Err(SprigError::Build {
            message: format!(
                "{} could not be optimised: {}",
                crate::output::plural(failed.len(), "file", "files"),
                failed.join(", ")
            ),
            help: None,
        })
    }
}

/// Expand the given paths into absolute files to optimise.
///
/// Relative paths are taken from the working directory. Directories are
/// searched recursively for `*.png`. Files are kept whatever their extension
/// so that non-PNG files can be reported as skipped.
pub fn collect_pngs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    collect_pngs_in(&std::env::current_dir()?, paths)
}

fn collect_pngs_in(base: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let path = base.join(path);
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_png(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path);
        } else {
            return Err(SprigError::MissingSource { path });
        }
    }

    files.dedup();
    Ok(files)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

impl Pipeline<'_> {
    /// Optimise files, skipping those the cache knows are already optimised.
    ///
    /// Inside a project the project cache is used and written back; outside
    /// one, nothing is remembered between runs.
    pub fn optimise(
        &self,
        files: &[PathBuf],
        project: Option<&Project>,
        options: &OptimiseOptions,
    ) -> Result<OptimiseReport> {
        let mut cache = match project {
            Some(project) => Cache::for_project(project).unwrap_or_else(|err| {
                warn!(error = %err, "discarding cache");
                Cache::empty(project.settings.cache.clone(), project.root.clone())
            }),
            None => Cache::in_memory(std::env::current_dir()?),
        };

        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|path| {
                if !is_png(path) {
                    FileOutcome::Skipped
                } else if !options.force && !cache.is_file_stale(path) {
                    FileOutcome::Unchanged
                } else {
                    match self.optimiser.optimise(path) {
                        Ok(saved) => FileOutcome::Optimised { saved },
                        Err(err) => FileOutcome::Failed(err),
                    }
                }
            })
            .collect();

        let mut report = OptimiseReport::default();
        for (path, outcome) in files.iter().zip(outcomes) {
            let outcome = match outcome {
                FileOutcome::Optimised { saved } => match cache.set_file(path) {
                    Ok(()) => FileOutcome::Optimised { saved },
                    Err(err) => FileOutcome::Failed(err),
                },
                other => other,
            };
            debug!(path = ?path, outcome = ?outcome, "optimise");
            report.files.push(FileReport {
                path: path.clone(),
                outcome,
            });
        }

        if let Some(project) = project {
            cache.clean(project.sprite_names());
        }
        cache.write()?;

        info!(
            optimised = report.optimised(),
            saved = report.bytes_saved(),
            "optimise finished"
        );
        Ok(report)
    }
}
