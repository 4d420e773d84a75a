//! Agroshop CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use agro_market::ListingFilter;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agro_cli::cli::{Cli, Commands};
use agro_cli::commands::{ListingsCommand, RentCommand};
use agro_cli::output::OutputFormat;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), agro_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Listings(args) => {
            let filter = ListingFilter {
                owner: args.owner,
                good: args.good,
            };
            let cmd = ListingsCommand::new(&args.store);
            cmd.execute(&mut stdout, &format, &filter, args.available)?;
        }
        Commands::Rent(args) => {
            let cmd = RentCommand::new(args.config.as_deref());
            cmd.execute(&mut stdout, &format)?;
        }
    }

    Ok(())
}
