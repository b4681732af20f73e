use anyhow::Result;
use clap::Parser;
use stepmap::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    stepmap::commands::analyze::run(&cli.path, cli.console)?;
    Ok(())
}

/// `-d` forces the debug filter; otherwise `RUST_LOG` applies with a
/// quiet default.
fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
