//! Project checks, run before every build.
//!
//! Configuration errors stop resolution outright; these checks only catch
//! projects which resolve but probably don't do what was intended.

mod checks;
mod warning;

pub use checks::IMAGE_EXTENSIONS;
pub use warning::{CheckReport, Diagnostic, Severity};

use crate::output::Printer;
use crate::types::Project;

/// Run every check against a project.
pub fn check_project(project: &Project) -> CheckReport {
    let mut report = CheckReport::new();

    report.merge(checks::check_empty_sprites(project));
    report.merge(checks::check_source_extensions(project));
    report.merge(checks::check_output_among_sources(project));

    report
}

/// Print diagnostics as status lines.
pub fn print_diagnostics(report: &CheckReport, printer: &Printer) {
    for d in report.iter() {
        match d.severity {
            Severity::Warning => printer.warning("Warning", &d.message),
            Severity::Error => printer.error("Error", &d.message),
        }
        if let Some(help) = &d.help {
            printer.detail(&format!("help: {}", help));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectSettings, SaveTarget, Source, Sprite};
    use std::path::PathBuf;

    #[test]
    fn test_check_clean_project() {
        let project = Project {
            root: PathBuf::from("/p"),
            config_path: None,
            settings: ProjectSettings {
                padding: 20,
                url: "/images/:filename".to_string(),
                sass: None,
                css: None,
                cache: None,
            },
            sprites: vec![Sprite::new(
                "fry",
                vec![Source::new("/p/sources/fry/one.png")],
                SaveTarget::File(PathBuf::from("/p/public/fry.png")),
                20,
                Some("/images/fry.png".to_string()),
            )],
        };

        assert!(check_project(&project).is_ok());
    }
}
