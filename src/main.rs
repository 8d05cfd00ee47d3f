use clap::Parser;
use miette::Result;
use sprig::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let printer = cli.printer();
    let start = cli.start();

    match cli.command {
        Commands::Build(args) => sprig::cli::build::run(args, &start, &printer)?,
        Commands::Optimise(args) => sprig::cli::optimise::run(args, &start, &printer)?,
        Commands::Position(args) => sprig::cli::position::run(args, &start, &printer)?,
        Commands::Init(args) => sprig::cli::init::run(args, &printer)?,
        Commands::Completions(args) => sprig::cli::completions::run(args)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "sprig=debug" } else { "sprig=warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
