use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transcript-recipes",
    about = "Collect cooking video transcripts and turn them into a recipe dataset",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape transcripts and append them to the transcript file
    Collect {
        /// Video URLs, collected after any configured ones
        #[arg(value_name = "URL")]
        urls: Vec<String>,

        /// File with one video URL per line
        #[arg(long, value_name = "FILE")]
        urls_file: Option<PathBuf>,

        /// Transcript file to append to
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate structured recipes and write the instruction dataset
    Generate {
        /// Transcript file produced by `collect`
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Dataset file to write
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
