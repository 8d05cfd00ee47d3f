//! The `build` pipeline: compose stale sprites, then regenerate stylesheets.
//!
//! Composition and optimisation run in parallel, one task per sprite. Cache
//! updates happen afterwards on the calling thread, and the cache is written
//! once at the end. A failing sprite doesn't stop the others: its error is
//! kept in the report and its cache entry is left untouched, so it is retried
//! next time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::{Result, SprigError};
use crate::render::{write_png, Placement};
use crate::stylesheet;
use crate::types::{Project, SaveTarget, Sprite};

use super::Pipeline;

/// Options for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Sprites to build; empty means all of them.
    pub sprites: Vec<String>,

    /// Ignore the cache and compose every selected sprite.
    pub force: bool,

    /// Skip optimisation.
    pub fast: bool,
}

/// What happened to one sprite.
#[derive(Debug)]
pub enum SpriteOutcome {
    /// Composed again. `saved` is `None` when optimisation was skipped.
    Built { saved: Option<u64> },
    /// Unchanged, but optimised for the first time.
    Optimised { saved: u64 },
    /// Unchanged.
    Fresh,
    /// No sources.
    Skipped,
    Failed(SprigError),
}

#[derive(Debug)]
pub struct SpriteReport {
    pub name: String,
    pub outcome: SpriteOutcome,
}

/// Everything a build did, in sprite order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub sprites: Vec<SpriteReport>,

    /// Stylesheets written.
    pub stylesheets: Vec<PathBuf>,

    /// Why stylesheets couldn't be written, if they couldn't.
    pub stylesheet_error: Option<SprigError>,

    /// A discarded cache file.
    pub cache_error: Option<SprigError>,
}

impl BuildReport {
    pub fn built(&self) -> usize {
        self.count(|o| matches!(o, SpriteOutcome::Built { .. }))
    }

    pub fn fresh(&self) -> usize {
        self.count(|o| matches!(o, SpriteOutcome::Fresh))
    }

    pub fn outcome(&self, sprite: &str) -> Option<&SpriteOutcome> {
        self.sprites
            .iter()
            .find(|r| r.name == sprite)
            .map(|r| &r.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SprigError)> {
        self.sprites.iter().filter_map(|r| match &r.outcome {
            SpriteOutcome::Failed(err) => Some((r.name.as_str(), err)),
            _ => None,
        })
    }

    /// Total bytes saved by optimisation.
    pub fn bytes_saved(&self) -> u64 {
        self.sprites
            .iter()
            .map(|r| match r.outcome {
                SpriteOutcome::Built { saved: Some(saved) } | SpriteOutcome::Optimised { saved } => saved,
                _ => 0,
            })
            .sum()
    }

    /// Turn failures into a single `Build` error.
    pub fn check(&self) -> Result<()> {
        let failed: Vec<&str> = self.failures().map(|(name, _)| name).collect();

        if failed.is_empty() && self.stylesheet_error.is_none() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if !failed.is_empty() {
            parts.push(format!(
                "{} failed: {}",
                crate::output::plural(failed.len(), "sprite", "sprites"),
                failed.join(", ")
            ));
        }
        if self.stylesheet_error.is_some() {
            parts.push("stylesheets were not written".to_string());
        }

        Err(SprigError::Build {
            message: parts.join("; "),
            help: Some("Fix the errors above and build again; finished sprites won't be rebuilt".to_string()),
        })
    }

    fn count(&self, predicate: impl Fn(&SpriteOutcome) -> bool) -> usize {
        self.sprites.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Skip,
    Fresh,
    Compose,
    Optimise,
}

impl Pipeline<'_> {
    /// Build a project.
    ///
    /// Errors which stop the whole build (an unknown sprite name, an unusable
    /// cache file) are returned before anything is composed. Everything
    /// else ends up in the report; see [`BuildReport::check`].
    pub fn build(&self, project: &Project, options: &BuildOptions) -> Result<BuildReport> {
        let selected = select(project, &options.sprites)?;
        let mut report = BuildReport::default();

        let mut cache = match Cache::for_project(project) {
            Ok(cache) => cache,
            Err(err @ SprigError::CacheCorruption { .. }) => {
                warn!(error = %err, "discarding cache");
                report.cache_error = Some(err);
                Cache::empty(project.settings.cache.clone(), project.root.clone())
            }
            Err(err) => return Err(err),
        };

        let payloads = stylesheet::existing_payloads(project);
        let plan: Vec<(&Sprite, Step)> = selected
            .into_iter()
            .map(|sprite| (sprite, plan_sprite(sprite, &cache, &payloads, options)))
            .collect();

        let scratch = if plan
            .iter()
            .any(|(sprite, step)| *step == Step::Compose && sprite.is_data_uri())
        {
            Some(tempfile::Builder::new().prefix("sprig-").tempdir()?)
        } else {
            None
        };
        let scratch_dir = scratch.as_ref().map(TempDir::path);

        let results: Vec<(SpriteOutcome, Option<PathBuf>)> = plan
            .par_iter()
            .map(|&(sprite, step)| self.run_step(sprite, step, scratch_dir, options.fast))
            .collect();

        let mut rendered = HashMap::new();
        for ((sprite, _), (outcome, path)) in plan.iter().zip(results) {
            let outcome = match record(&mut cache, sprite, outcome) {
                Ok(outcome) => outcome,
                Err(err) => SpriteOutcome::Failed(err),
            };

            if let (SpriteOutcome::Built { .. }, Some(path)) = (&outcome, path) {
                if sprite.is_data_uri() {
                    rendered.insert(sprite.name.clone(), path);
                }
            }

            report.sprites.push(SpriteReport {
                name: sprite.name.clone(),
                outcome,
            });
        }

        match self.write_stylesheets(project, &rendered) {
            Ok(paths) => report.stylesheets = paths,
            Err(err) => {
                warn!(error = %err, "stylesheets not written");
                report.stylesheet_error = Some(err);
            }
        }

        cache.clean(project.sprite_names());
        cache.write()?;

        info!(
            built = report.built(),
            fresh = report.fresh(),
            failed = report.failures().count(),
            "build finished"
        );

        Ok(report)
    }

    fn run_step(
        &self,
        sprite: &Sprite,
        step: Step,
        scratch: Option<&Path>,
        fast: bool,
    ) -> (SpriteOutcome, Option<PathBuf>) {
        match step {
            Step::Skip => (SpriteOutcome::Skipped, None),
            Step::Fresh => (SpriteOutcome::Fresh, None),
            Step::Compose => match self.compose(sprite, scratch, fast) {
                Ok((path, saved)) => (SpriteOutcome::Built { saved }, Some(path)),
                Err(err) => (SpriteOutcome::Failed(err), None),
            },
            Step::Optimise => {
                let Some(path) = sprite.save_path() else {
                    return (SpriteOutcome::Fresh, None);
                };
                match self.optimiser.optimise(path) {
                    Ok(saved) => (SpriteOutcome::Optimised { saved }, Some(path.to_path_buf())),
                    Err(err) => (SpriteOutcome::Failed(err), None),
                }
            }
        }
    }

    /// Compose one sprite, write it and optimise it unless `fast`.
    fn compose(&self, sprite: &Sprite, scratch: Option<&Path>, fast: bool) -> Result<(PathBuf, Option<u64>)> {
        let layout = sprite.layout(self.inspector)?;
        let placements: Vec<Placement<'_>> = sprite
            .sources
            .iter()
            .zip(&layout.positions)
            .map(|(source, position)| Placement {
                path: &source.path,
                x: position.x,
                y: position.y,
            })
            .collect();

        let bytes = self
            .composer
            .compose(&placements, layout.canvas())
            .map_err(|err| match err {
                SprigError::MissingSource { .. } => err,
                other => SprigError::Render {
                    sprite: sprite.name.clone(),
                    message: other.to_string(),
                },
            })?;

        let destination = match &sprite.target {
            SaveTarget::File(path) => path.clone(),
            SaveTarget::DataUri => scratch
                .map(|dir| dir.join(format!("{}.png", sprite.name)))
                .ok_or_else(|| SprigError::Render {
                    sprite: sprite.name.clone(),
                    message: "no scratch directory for data URI output".to_string(),
                })?,
        };
        write_png(&bytes, &destination)?;

        let saved = if fast {
            None
        } else {
            Some(self.optimiser.optimise(&destination)?)
        };

        debug!(sprite = %sprite.name, path = ?destination, bytes = bytes.len(), ?saved, "composed sprite");
        Ok((destination, saved))
    }

    fn write_stylesheets(&self, project: &Project, rendered: &HashMap<String, PathBuf>) -> Result<Vec<PathBuf>> {
        let layout = project.lay_out(self.inspector)?;
        let payloads = stylesheet::collect_payloads(project, rendered)?;
        let mut written = Vec::new();

        if stylesheet::generate_sass(&layout, &payloads)? {
            if let Some(path) = &project.settings.sass {
                written.push(stylesheet::sass_output_path(path));
            }
        }
        if stylesheet::generate_css(&layout, &payloads)? {
            if let Some(path) = &project.settings.css {
                written.push(stylesheet::css_output_path(path));
            }
        }

        Ok(written)
    }
}

/// Sprites named on the command line, in project order. All of them when
/// none are named.
fn select<'p>(project: &'p Project, names: &[String]) -> Result<Vec<&'p Sprite>> {
    if let Some(unknown) = names.iter().find(|name| project.sprite(name).is_none()) {
        return Err(SprigError::UnknownSprite {
            name: unknown.clone(),
        });
    }

    Ok(project
        .sprites
        .iter()
        .filter(|sprite| names.is_empty() || names.contains(&sprite.name))
        .collect())
}

fn plan_sprite(
    sprite: &Sprite,
    cache: &Cache,
    payloads: &HashMap<String, String>,
    options: &BuildOptions,
) -> Step {
    if sprite.is_empty() {
        return Step::Skip;
    }

    let missing_payload = sprite.is_data_uri() && !payloads.contains_key(&sprite.name);
    if options.force || missing_payload || cache.is_sprite_stale(sprite) {
        return Step::Compose;
    }

    match sprite.save_path() {
        Some(path) if !options.fast && cache.is_file_stale(path) => Step::Optimise,
        _ => Step::Fresh,
    }
}

/// Record a finished sprite in the cache.
fn record(cache: &mut Cache, sprite: &Sprite, outcome: SpriteOutcome) -> Result<SpriteOutcome> {
    match &outcome {
        SpriteOutcome::Built { saved } => {
            cache.set_sprite(sprite)?;
            if let (Some(_), Some(path)) = (saved, sprite.save_path()) {
                cache.set_file(path)?;
            }
        }
        SpriteOutcome::Optimised { .. } => {
            if let Some(path) = sprite.save_path() {
                cache.set_file(path)?;
            }
        }
        _ => {}
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, resolve, ConfigFormat};
    use crate::pipeline::testing::{write_image, CountingComposer, RecordingOptimiser};
    use crate::render::ImageBackend;
    use std::fs;
    use tempfile::tempdir;

    fn load(root: &Path, yaml: &str) -> Project {
        resolve(&parse_config(yaml, root, ConfigFormat::Yaml).unwrap()).unwrap()
    }

    fn fry_project(root: &Path) -> Project {
        write_image(&root.join("sources/fry/one.png"), 10, 20);
        write_image(&root.join("sources/fry/two.png"), 10, 20);
        load(
            root,
            "sprites:\n  - \"sources/:name/*\": \"public/images/:name.png\"\n",
        )
    }

    fn sass(root: &Path) -> String {
        fs::read_to_string(root.join("public/stylesheets/sass/_sprig.sass")).unwrap()
    }

    #[test]
    fn test_build_composes_sprite_and_stylesheet() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();

        assert_eq!(report.built(), 1);
        assert!(report.check().is_ok());
        assert_eq!(report.bytes_saved(), 7);

        let sprite_path = dir.path().join("public/images/fry.png");
        assert_eq!(image::image_dimensions(&sprite_path).unwrap(), (10, 60));
        assert_eq!(optimiser.paths(), vec![sprite_path]);

        let sass = sass(dir.path());
        assert!(sass.contains("@if $source == \"fry/one\""));
        assert!(sass.contains("background: url(/images/fry.png) (0px + $x-offset) (-40px + $y-offset) no-repeat"));
        assert!(dir.path().join(".sprig-cache").is_file());
    }

    #[test]
    fn test_second_build_is_fresh() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        pipeline.build(&project, &BuildOptions::default()).unwrap();
        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();

        assert_eq!(composer.calls(), 1);
        assert!(matches!(report.outcome("fry"), Some(SpriteOutcome::Fresh)));
    }

    #[test]
    fn test_changed_source_and_deleted_output_rebuild() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        pipeline.build(&project, &BuildOptions::default()).unwrap();

        write_image(&dir.path().join("sources/fry/two.png"), 10, 30);
        let project = fry_project_after_change(dir.path());
        pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert_eq!(composer.calls(), 2);

        fs::remove_file(dir.path().join("public/images/fry.png")).unwrap();
        pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert_eq!(composer.calls(), 3);
    }

    fn fry_project_after_change(root: &Path) -> Project {
        load(
            root,
            "sprites:\n  - \"sources/:name/*\": \"public/images/:name.png\"\n",
        )
    }

    #[test]
    fn test_force_rebuilds() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        pipeline.build(&project, &BuildOptions::default()).unwrap();
        let options = BuildOptions {
            force: true,
            ..BuildOptions::default()
        };
        pipeline.build(&project, &options).unwrap();

        assert_eq!(composer.calls(), 2);
    }

    #[test]
    fn test_fast_build_is_optimised_later() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let fast = BuildOptions {
            fast: true,
            ..BuildOptions::default()
        };
        let report = pipeline.build(&project, &fast).unwrap();
        assert!(matches!(
            report.outcome("fry"),
            Some(SpriteOutcome::Built { saved: None })
        ));
        assert!(optimiser.paths().is_empty());

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert!(matches!(
            report.outcome("fry"),
            Some(SpriteOutcome::Optimised { saved: 7 })
        ));
        assert_eq!(composer.calls(), 1);

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert!(matches!(report.outcome("fry"), Some(SpriteOutcome::Fresh)));
    }

    #[test]
    fn test_data_uri_sprite() {
        let dir = tempdir().unwrap();
        write_image(&dir.path().join("sources/icons/a.png"), 8, 8);
        write_image(&dir.path().join("sources/icons/b.png"), 8, 8);
        let project = load(dir.path(), "sprites:\n  - \"sources/icons\": data_uri\n");
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert_eq!(report.built(), 1);

        let sass = sass(dir.path());
        assert!(sass.contains(".icons_data\n  background: url(data:image/png;base64,"));
        assert!(sass.contains("@extend .icons_data"));
        assert!(!dir.path().join("public/images").exists());

        // The scratch image is gone, so the payload comes from the stylesheet.
        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert!(matches!(report.outcome("icons"), Some(SpriteOutcome::Fresh)));
        assert_eq!(self::sass(dir.path()), sass);

        // Without a stylesheet the payload has to be rendered again.
        fs::remove_file(dir.path().join("public/stylesheets/sass/_sprig.sass")).unwrap();
        pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert_eq!(composer.calls(), 2);
    }

    #[test]
    fn test_partial_failure() {
        let dir = tempdir().unwrap();
        write_image(&dir.path().join("sources/fry/one.png"), 10, 20);
        write_image(&dir.path().join("sources/leela/one.png"), 10, 20);
        let project = load(
            dir.path(),
            "sprites:\n  - \"sources/:name/*\": \"public/images/:name.png\"\n",
        );
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::failing_on(dir.path().join("public/images/leela.png"));
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();

        assert!(matches!(report.outcome("fry"), Some(SpriteOutcome::Built { .. })));
        assert!(matches!(report.outcome("leela"), Some(SpriteOutcome::Failed(SprigError::Optimise { .. }))));
        assert!(sass(dir.path()).contains("leela/one"));
        assert!(matches!(report.check(), Err(SprigError::Build { .. })));

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();
        assert!(matches!(report.outcome("fry"), Some(SpriteOutcome::Fresh)));
        assert!(matches!(report.outcome("leela"), Some(SpriteOutcome::Failed(_))));
    }

    #[test]
    fn test_selected_sprites() {
        let dir = tempdir().unwrap();
        write_image(&dir.path().join("sources/fry/one.png"), 10, 20);
        write_image(&dir.path().join("sources/leela/one.png"), 10, 20);
        let project = load(
            dir.path(),
            "sprites:\n  - \"sources/:name/*\": \"public/images/:name.png\"\n",
        );
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let options = BuildOptions {
            sprites: vec!["leela".to_string()],
            ..BuildOptions::default()
        };
        let report = pipeline.build(&project, &options).unwrap();

        assert_eq!(report.sprites.len(), 1);
        assert!(!dir.path().join("public/images/fry.png").exists());
        // Unbuilt sprites are still described by the stylesheet.
        assert!(sass(dir.path()).contains("fry/one"));
    }

    #[test]
    fn test_unknown_sprite_fails_before_rendering() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let options = BuildOptions {
            sprites: vec!["bender".to_string()],
            ..BuildOptions::default()
        };
        let err = pipeline.build(&project, &options).unwrap_err();

        assert!(matches!(err, SprigError::UnknownSprite { .. }));
        assert_eq!(composer.calls(), 0);
        assert!(!dir.path().join("public").exists());
    }

    #[test]
    fn test_empty_sprite_is_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sources/empty")).unwrap();
        let project = load(dir.path(), "sprites:\n  - \"sources/empty\": \"public/empty.png\"\n");
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();

        assert!(matches!(report.outcome("empty"), Some(SpriteOutcome::Skipped)));
        assert_eq!(composer.calls(), 0);
        assert!(report.check().is_ok());
    }

    #[test]
    fn test_corrupt_cache_is_discarded() {
        let dir = tempdir().unwrap();
        let project = fry_project(dir.path());
        fs::write(dir.path().join(".sprig-cache"), "not json").unwrap();
        let composer = CountingComposer::default();
        let optimiser = RecordingOptimiser::default();
        let pipeline = Pipeline::new(&ImageBackend, &composer, &optimiser);

        let report = pipeline.build(&project, &BuildOptions::default()).unwrap();

        assert!(matches!(report.cache_error, Some(SprigError::CacheCorruption { .. })));
        assert_eq!(report.built(), 1);
        let cache = Cache::for_project(&project).unwrap();
        assert!(!cache.is_sprite_stale(&project.sprites[0]));
    }
}
