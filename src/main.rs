use anyhow::Result;
use clap::Parser;
use tcbvrp::{CLIArguments, export_main, solve_main};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    // Solver logs go to stdout, diagnostics to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = CLIArguments::parse();

    match args {
        CLIArguments::Solve(args) => solve_main(args),
        CLIArguments::Export(args) => export_main(args),
    }
}
