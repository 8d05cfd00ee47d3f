//! Optimise command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use crate::config;
use crate::error::Result;
use crate::output::{display_path, format_bytes, plural, Printer};
use crate::pipeline::{collect_pngs, Backends, FileOutcome, OptimiseOptions, OptimiseReport};

/// Losslessly re-compress PNG files
#[derive(Args, Debug)]
pub struct OptimiseArgs {
    /// Files or directories to optimise
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Optimise files even if they haven't changed since the last run
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: OptimiseArgs, start: &Path, printer: &Printer) -> Result<()> {
    // Outside a project there is no cache to consult.
    let project = match config::load_project(start) {
        Ok(project) => Some(project),
        Err(err) => {
            debug!(error = %err, "optimising without a project");
            None
        }
    };

    let files = collect_pngs(&args.paths)?;
    if files.is_empty() {
        printer.warning("Warning", "no PNG files found");
        return Ok(());
    }

    let backends = Backends::new();
    let options = OptimiseOptions { force: args.force };
    let report = backends
        .pipeline()
        .optimise(&files, project.as_ref(), &options)?;

    print_report(&report, printer);
    report.check()
}

fn print_report(report: &OptimiseReport, printer: &Printer) {
    for file in &report.files {
        let path = display_path(&file.path);
        match &file.outcome {
            FileOutcome::Optimised { saved } => printer.status(
                "Optimised",
                &format!("{} {}", path, printer.dim(&format!("(saved {})", format_bytes(*saved)))),
            ),
            FileOutcome::Unchanged => printer.info("Unchanged", &path),
            FileOutcome::Skipped => printer.warning("Skipping", &format!("{} (not a PNG)", path)),
            FileOutcome::Failed(err) => printer.error("Failed", &format!("{}: {}", path, err)),
        }
    }

    let mut summary = plural(report.optimised(), "file", "files") + " optimised";
    let saved = report.bytes_saved();
    if saved > 0 {
        summary.push_str(&format!(", {} saved", format_bytes(saved)));
    }
    printer.success("Finished", &summary);
}
