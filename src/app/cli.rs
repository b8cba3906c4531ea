use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run `go test` across a directory tree and summarize the results"
)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, short = 'c', default_value = "config.json")]
    pub config: PathBuf,
}
