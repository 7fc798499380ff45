use clap::Parser;
use tracing_subscriber::EnvFilter;

mod calling;
mod cli;
mod core;
mod output;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("rna_bitvector=debug,info")
    } else {
        EnvFilter::new("rna_bitvector=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Classify(args) => {
            cli::classify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::CheckDeletion(args) => {
            cli::check_deletion::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
