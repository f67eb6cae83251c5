use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "alink",
    about = "Inspect and re-save linked asset metadata",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the decoded model of an object
    Show(ObjectArgs),
    /// Print the writes a save would issue
    Plan(ObjectArgs),
    /// Load and save an object unchanged
    Resave(ObjectArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ObjectArgs {
    /// JSON fixture describing the store contents
    #[arg(long)]
    pub fixture: PathBuf,

    /// Library holding the object
    #[arg(long)]
    pub library: String,

    /// Object to open
    #[arg(long)]
    pub object: String,

    /// Version to open instead of the latest
    #[arg(long)]
    pub at_version: Option<String>,

    /// Editor configuration (.toml or .json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum link resolutions in flight
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}
