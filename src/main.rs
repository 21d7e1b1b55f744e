use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ccsearch::cli::{Cli, run};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

/// Logs go to stderr so command output on stdout stays pipeable
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "warn,ccsearch=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
