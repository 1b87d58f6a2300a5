mod cli;
mod report;

use clap::Parser;
use cli::{Cli, Commands};
use fileloader::config::{self, FilterConfig};
use fileloader::{AsyncFileLoader, FileLoader, LoaderError};
use report::Outcome;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NO_MATCH: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 2;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn filters() -> Result<FilterConfig, LoaderError> {
    Ok(config::load_config(Path::new("."))?
        .map(|cfg| cfg.filters)
        .unwrap_or_default())
}

fn run_blocking(command: Commands) -> Result<Outcome, LoaderError> {
    let loader = FileLoader::new();
    let outcome = match command {
        Commands::Exists(cmd) => Outcome::Answer(loader.exists(&cmd.path)),
        Commands::IsDir(cmd) => Outcome::Answer(loader.is_directory(&cmd.path)),
        Commands::Load(cmd) => Outcome::Contents(loader.load_all(&cmd.paths)?),
        Commands::Find(cmd) => {
            let options = filters()?.list_options(&cmd.extensions, &cmd.exclude, false);
            if cmd.load {
                Outcome::FoundContents(loader.load_with_first_matched_extension(
                    &cmd.path,
                    &options.extensions,
                    &options.exclude,
                )?)
            } else {
                Outcome::Found(loader.get_with_first_matched_extension(
                    &cmd.path,
                    &options.extensions,
                    &options.exclude,
                ))
            }
        }
        Commands::Any(cmd) => {
            let loaded = loader.load_any(&cmd.paths);
            if cmd.load {
                Outcome::FoundContents(loaded)
            } else {
                Outcome::Found(loaded.map(|file| file.path))
            }
        }
        Commands::List(cmd) => {
            let options = filters()?.list_options(&cmd.extensions, &cmd.exclude, cmd.recursive);
            if cmd.load {
                Outcome::Contents(loader.load_all_in_directory(&cmd.directory, &options)?)
            } else {
                Outcome::Listing(
                    loader.get_all_in_directory(&cmd.directory, &options)?,
                    cmd.format,
                )
            }
        }
        Commands::Checksum(cmd) => Outcome::Digest(loader.get_checksum(&cmd.path)?),
    };
    Ok(outcome)
}

async fn run_nonblocking(command: Commands) -> Result<Outcome, LoaderError> {
    let loader = AsyncFileLoader::new();
    let outcome = match command {
        Commands::Exists(cmd) => Outcome::Answer(loader.exists(&cmd.path).await),
        Commands::IsDir(cmd) => Outcome::Answer(loader.is_directory(&cmd.path).await),
        Commands::Load(cmd) => Outcome::Contents(loader.load_all(&cmd.paths).await?),
        Commands::Find(cmd) => {
            let options = filters()?.list_options(&cmd.extensions, &cmd.exclude, false);
            if cmd.load {
                Outcome::FoundContents(
                    loader
                        .load_with_first_matched_extension(
                            &cmd.path,
                            &options.extensions,
                            &options.exclude,
                        )
                        .await?,
                )
            } else {
                Outcome::Found(
                    loader
                        .get_with_first_matched_extension(
                            &cmd.path,
                            &options.extensions,
                            &options.exclude,
                        )
                        .await,
                )
            }
        }
        Commands::Any(cmd) => {
            let loaded = loader.load_any(&cmd.paths).await;
            if cmd.load {
                Outcome::FoundContents(loaded)
            } else {
                Outcome::Found(loaded.map(|file| file.path))
            }
        }
        Commands::List(cmd) => {
            let options = filters()?.list_options(&cmd.extensions, &cmd.exclude, cmd.recursive);
            if cmd.load {
                Outcome::Contents(
                    loader
                        .load_all_in_directory(&cmd.directory, &options)
                        .await?,
                )
            } else {
                Outcome::Listing(
                    loader
                        .get_all_in_directory(&cmd.directory, &options)
                        .await?,
                    cmd.format,
                )
            }
        }
        Commands::Checksum(cmd) => Outcome::Digest(loader.get_checksum(&cmd.path).await?),
    };
    Ok(outcome)
}

fn run() -> Result<i32, LoaderError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let outcome = if cli.nonblocking {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(LoaderError::Runtime)?;
        runtime.block_on(run_nonblocking(cli.command))?
    } else {
        run_blocking(cli.command)?
    };
    report::render_stdout(outcome)
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
