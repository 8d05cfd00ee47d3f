pub mod build;
pub mod completions;
pub mod init;
pub mod optimise;
pub mod position;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::Printer;

/// sprig - Sprite and stylesheet generator
#[derive(Parser, Debug)]
#[command(name = "sprig")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory or config file (default: search upwards from the current directory)
    #[arg(short = 'C', long, global = true, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long = "no-colour", visible_alias = "no-color", global = true)]
    pub no_colour: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Status line printer honouring `--no-colour`.
    pub fn printer(&self) -> Printer {
        if self.no_colour {
            Printer::with_color(false)
        } else {
            Printer::new()
        }
    }

    /// Where project discovery starts.
    pub fn start(&self) -> PathBuf {
        self.project.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose sprites and write stylesheets
    Build(build::BuildArgs),

    /// Losslessly re-compress PNG images
    #[command(alias = "optimize")]
    Optimise(optimise::OptimiseArgs),

    /// Show where a source sits within its sprite
    Position(position::PositionArgs),

    /// Create a sprig project in the current directory
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_optimize_alias() {
        let cli = Cli::try_parse_from(["sprig", "optimize", "public/images"]).unwrap();
        assert!(matches!(cli.command, Commands::Optimise(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sprig", "build", "fry", "--force", "-v", "-C", "site"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.start(), PathBuf::from("site"));
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.sprites, vec!["fry"]);
                assert!(args.force);
                assert!(!args.fast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_no_colour_flag() {
        let cli = Cli::try_parse_from(["sprig", "position", "fry/one", "--no-colour"]).unwrap();
        assert!(cli.no_colour);
        assert_eq!(cli.printer().bold("fry"), "fry");

        let cli = Cli::try_parse_from(["sprig", "--no-color", "build"]).unwrap();
        assert!(cli.no_colour);
    }
}
