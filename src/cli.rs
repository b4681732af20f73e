use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stepmap")]
#[command(
    about = "State machine diagram extractor for step-function style Go code",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Path to the source file to analyze
    pub path: PathBuf,

    /// Echo the rendered diagram to stdout
    #[arg(short, long)]
    pub console: bool,

    /// Enable debug trace output
    #[arg(short, long)]
    pub debug: bool,
}
