use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fileloader",
    version,
    about = "Check, load, and list files with first-match fallback"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Run through the async loader on a single-threaded runtime
    #[arg(long, global = true)]
    pub nonblocking: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Exit 0 when the path is a readable file
    Exists(PathCommand),
    /// Exit 0 when the path is a directory
    IsDir(PathCommand),
    /// Write the contents of every path to stdout, failing if any is unreadable
    Load(LoadCommand),
    /// Resolve a path against candidate extensions
    Find(FindCommand),
    /// Pick the first path that loads
    Any(AnyCommand),
    /// List files in a directory
    List(ListCommand),
    /// Print the content hash of a file or directory tree
    Checksum(PathCommand),
}

#[derive(Args)]
pub struct PathCommand {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LoadCommand {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct FindCommand {
    pub path: PathBuf,
    /// Candidate extensions, tried in order (falls back to config)
    #[arg(short, long = "ext")]
    pub extensions: Vec<String>,
    /// Reject candidates ending with these suffixes
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,
    /// Print the matched file's contents instead of its path
    #[arg(long)]
    pub load: bool,
}

#[derive(Args)]
pub struct AnyCommand {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Print the matched file's contents instead of its path
    #[arg(long)]
    pub load: bool,
}

#[derive(Args)]
pub struct ListCommand {
    pub directory: PathBuf,
    #[arg(short, long = "ext")]
    pub extensions: Vec<String>,
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,
    #[arg(short, long)]
    pub recursive: bool,
    /// Print the contents of every listed file instead of the paths
    #[arg(long, conflicts_with = "format")]
    pub load: bool,
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ListFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ListFormat {
    Text,
    Json,
}
