//! Build command implementation.
//!
//! Composes every stale sprite in the project and regenerates stylesheets.

use std::path::Path;

use clap::Args;

use crate::config;
use crate::error::{Result, SprigError};
use crate::output::{display_path, format_bytes, plural, Printer};
use crate::pipeline::{Backends, BuildOptions, BuildReport, SpriteOutcome};
use crate::validation::{check_project, print_diagnostics};

/// Compose sprites and write stylesheets
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Sprites to build (default: all)
    pub sprites: Vec<String>,

    /// Rebuild sprites even if they haven't changed
    #[arg(long)]
    pub force: bool,

    /// Skip PNG optimisation
    #[arg(long)]
    pub fast: bool,
}

pub fn run(args: BuildArgs, start: &Path, printer: &Printer) -> Result<()> {
    let project = config::load_project(start)?;
    if let Some(config_path) = &project.config_path {
        printer.status("Loading", &display_path(config_path));
    }

    let checks = check_project(&project);
    print_diagnostics(&checks, printer);
    if checks.has_errors() {
        return Err(SprigError::Build {
            message: "project checks failed; nothing was built".to_string(),
            help: Some("Fix the errors above and build again".to_string()),
        });
    }

    let backends = Backends::new();
    let options = BuildOptions {
        sprites: args.sprites,
        force: args.force,
        fast: args.fast,
    };
    let report = backends.pipeline().build(&project, &options)?;

    print_report(&report, printer);
    report.check()
}

fn print_report(report: &BuildReport, printer: &Printer) {
    if let Some(err) = &report.cache_error {
        printer.warning("Warning", &format!("{}", err));
    }

    for sprite in &report.sprites {
        match &sprite.outcome {
            SpriteOutcome::Built { saved: Some(saved) } if *saved > 0 => printer.status(
                "Built",
                &format!("{} {}", sprite.name, printer.dim(&format!("(saved {})", format_bytes(*saved)))),
            ),
            SpriteOutcome::Built { .. } => printer.status("Built", &sprite.name),
            SpriteOutcome::Optimised { saved } => printer.status(
                "Optimised",
                &format!("{} {}", sprite.name, printer.dim(&format!("(saved {})", format_bytes(*saved)))),
            ),
            SpriteOutcome::Fresh => printer.info("Fresh", &sprite.name),
            SpriteOutcome::Skipped => printer.warning("Skipped", &format!("{} (no sources)", sprite.name)),
            SpriteOutcome::Failed(err) => printer.error("Failed", &format!("{}: {}", sprite.name, err)),
        }
    }

    match &report.stylesheet_error {
        Some(err) => printer.error("Failed", &format!("stylesheets: {}", err)),
        None => {
            for path in &report.stylesheets {
                printer.status("Generated", &display_path(path));
            }
        }
    }

    let built = report.built();
    let mut summary = plural(built, "sprite", "sprites") + " built";
    if report.fresh() > 0 {
        summary.push_str(&format!(", {} unchanged", report.fresh()));
    }
    let saved = report.bytes_saved();
    if saved > 0 {
        summary.push_str(&format!(", {} saved", format_bytes(saved)));
    }
    printer.success("Finished", &summary);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::write_image;
    use std::fs;
    use tempfile::tempdir;

    fn args() -> BuildArgs {
        BuildArgs {
            sprites: vec![],
            force: false,
            fast: true,
        }
    }

    #[test]
    fn test_build_project() {
        let dir = tempdir().unwrap();
        write_image(&dir.path().join("sources/fry/one.png"), 4, 4);
        fs::write(
            dir.path().join(".sprig"),
            "sprites \"sources/:name/*\" => \"public/images/:name.png\"\n",
        )
        .unwrap();

        run(args(), dir.path(), &Printer::with_color(false)).unwrap();

        assert!(dir.path().join("public/images/fry.png").is_file());
        assert!(dir.path().join("public/stylesheets/sass/_sprig.sass").is_file());
    }

    #[test]
    fn test_build_without_project() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("missing.yml");

        let err = run(args(), &config, &Printer::with_color(false)).unwrap_err();
        assert!(matches!(err, SprigError::Io { .. } | SprigError::MissingProject { .. }));
    }

    #[test]
    fn test_config_error_stops_build() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".sprig"),
            "config.sass false\nsprite \"sources/icons\" => data_uri\n",
        )
        .unwrap();

        let err = run(args(), dir.path(), &Printer::with_color(false)).unwrap_err();
        assert!(matches!(err, SprigError::Config(_)));
        assert!(!dir.path().join(".sprig-cache").exists());
    }

    #[test]
    fn test_check_errors_stop_build() {
        let dir = tempdir().unwrap();
        write_image(&dir.path().join("sources/fry/one.png"), 4, 4);
        write_image(&dir.path().join("sources/fry/fry.png"), 4, 4);
        fs::write(
            dir.path().join(".sprig"),
            "sprites \"sources/:name/*\" => \"sources/:name/:name.png\"\n",
        )
        .unwrap();

        let err = run(args(), dir.path(), &Printer::with_color(false)).unwrap_err();
        assert!(matches!(err, SprigError::Build { .. }));
        assert!(!dir.path().join(".sprig-cache").exists());
        assert!(!dir.path().join("public/stylesheets/sass/_sprig.sass").exists());
    }
}
