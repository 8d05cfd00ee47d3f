//! Individual project checks.
//!
//! Each check takes a `&Project` and returns a `CheckReport`. Errors stop a
//! build before anything is written; warnings don't.

use crate::types::Project;

use super::warning::{CheckReport, Diagnostic};

/// Extensions the image backend can read.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

/// Sprites whose source pattern matched nothing.
pub fn check_empty_sprites(project: &Project) -> CheckReport {
    let mut report = CheckReport::new();

    for sprite in project.sprites.iter().filter(|s| s.is_empty()) {
        report.push(
            Diagnostic::warning(
                "sprig::check::empty-sprite",
                format!("Sprite `{}` has no sources and will be skipped", sprite.name),
            )
            .for_sprite(&sprite.name)
            .with_help("Check that the source pattern matches some files"),
        );
    }

    report
}

/// Sources that don't look like raster images.
pub fn check_source_extensions(project: &Project) -> CheckReport {
    let mut report = CheckReport::new();

    for sprite in &project.sprites {
        for source in &sprite.sources {
            let extension = source
                .path
                .extension()
                .map(|e| e.to_string_lossy().to_ascii_lowercase());

            let known = extension
                .as_deref()
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e));
            if !known {
                report.push(
                    Diagnostic::warning(
                        "sprig::check::unknown-extension",
                        format!(
                            "Source `{}` of sprite `{}` is not a recognised image: {}",
                            source.name,
                            sprite.name,
                            source.path.display()
                        ),
                    )
                    .for_sprite(&sprite.name)
                    .with_help("Narrow the source pattern, e.g. `sources/fry/*.png`"),
                );
            }
        }
    }

    report
}

/// Sprites which would read their own output on the next build.
pub fn check_output_among_sources(project: &Project) -> CheckReport {
    let mut report = CheckReport::new();

    for sprite in &project.sprites {
        let Some(save_path) = sprite.save_path() else {
            continue;
        };
        if sprite.sources.iter().any(|s| s.path == save_path) {
            report.push(
                Diagnostic::error(
                    "sprig::check::output-is-source",
                    format!("Sprite `{}` is saved over one of its own sources", sprite.name),
                )
                .for_sprite(&sprite.name)
                .with_help("Save sprites outside of the source directories"),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectSettings, SaveTarget, Source, Sprite};
    use std::path::PathBuf;

    fn project(sprites: Vec<Sprite>) -> Project {
        Project {
            root: PathBuf::from("/p"),
            config_path: None,
            settings: ProjectSettings {
                padding: 20,
                url: "/images/:filename".to_string(),
                sass: None,
                css: None,
                cache: None,
            },
            sprites,
        }
    }

    fn sprite(name: &str, sources: &[&str]) -> Sprite {
        Sprite::new(
            name,
            sources.iter().map(|s| Source::new(*s)).collect(),
            SaveTarget::File(PathBuf::from(format!("/p/public/{}.png", name))),
            20,
            None,
        )
    }

    #[test]
    fn test_empty_sprite() {
        let report = check_empty_sprites(&project(vec![
            sprite("fry", &["/p/fry/one.png"]),
            sprite("leela", &[]),
        ]));

        assert_eq!(report.warning_count(), 1);
        assert!(report.mentions("leela"));
        assert!(!report.mentions("fry"));
    }

    #[test]
    fn test_unknown_extension() {
        let report = check_source_extensions(&project(vec![sprite(
            "fry",
            &["/p/fry/one.PNG", "/p/fry/notes.txt", "/p/fry/README"],
        )]));

        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn test_output_among_sources() {
        let report = check_output_among_sources(&project(vec![sprite(
            "fry",
            &["/p/public/fry.png", "/p/public/leela.png"],
        )]));

        assert!(report.mentions("fry"));
        assert!(report.has_errors());
        assert_eq!(report.warning_count(), 0);
    }
}
