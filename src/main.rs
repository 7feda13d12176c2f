use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod matching;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("clinic_dx=debug,info")
    } else {
        EnvFilter::new("clinic_dx=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Differential(args) => {
            cli::differential::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Symptoms(args) => {
            cli::symptoms::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Session(args) => {
            cli::session::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Catalog(args) => {
            cli::catalog::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
