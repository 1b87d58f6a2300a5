use crate::cli::ListFormat;
use crate::exit_code;
use fileloader::{LoadedFile, LoaderError};
use std::io::{self, Write};
use std::path::PathBuf;

/// What a command produced, independent of which loader ran it.
#[derive(Debug)]
pub enum Outcome {
    Answer(bool),
    Contents(Vec<Vec<u8>>),
    Found(Option<PathBuf>),
    FoundContents(Option<LoadedFile>),
    Listing(Vec<PathBuf>, ListFormat),
    Digest(String),
}

/// Writes the outcome to `out` and returns the process exit code.
///
/// A reader that hangs up early (`fileloader load big | head`) is not a failure.
pub fn render(outcome: Outcome, out: &mut impl Write) -> Result<i32, LoaderError> {
    match write_outcome(outcome, out) {
        Err(LoaderError::Runtime(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("stdout closed early");
            Ok(exit_code::SUCCESS)
        }
        result => result,
    }
}

fn write_outcome(outcome: Outcome, out: &mut impl Write) -> Result<i32, LoaderError> {
    let code = match outcome {
        Outcome::Answer(answer) => {
            writeln!(out, "{answer}").map_err(LoaderError::Runtime)?;
            if answer {
                exit_code::SUCCESS
            } else {
                exit_code::NO_MATCH
            }
        }
        Outcome::Contents(contents) => {
            for bytes in &contents {
                out.write_all(bytes).map_err(LoaderError::Runtime)?;
            }
            exit_code::SUCCESS
        }
        Outcome::Found(Some(path)) => {
            writeln!(out, "{}", path.display()).map_err(LoaderError::Runtime)?;
            exit_code::SUCCESS
        }
        Outcome::FoundContents(Some(file)) => {
            tracing::info!(path = %file.path.display(), bytes = file.contents.len(), "loaded");
            out.write_all(&file.contents).map_err(LoaderError::Runtime)?;
            exit_code::SUCCESS
        }
        Outcome::Found(None) | Outcome::FoundContents(None) => exit_code::NO_MATCH,
        Outcome::Listing(paths, ListFormat::Text) => {
            for path in &paths {
                writeln!(out, "{}", path.display()).map_err(LoaderError::Runtime)?;
            }
            exit_code::SUCCESS
        }
        Outcome::Listing(paths, ListFormat::Json) => {
            let json = serde_json::to_string_pretty(&paths)?;
            writeln!(out, "{json}").map_err(LoaderError::Runtime)?;
            exit_code::SUCCESS
        }
        Outcome::Digest(digest) => {
            writeln!(out, "{digest}").map_err(LoaderError::Runtime)?;
            exit_code::SUCCESS
        }
    };
    out.flush().map_err(LoaderError::Runtime)?;
    Ok(code)
}

pub fn render_stdout(outcome: Outcome) -> Result<i32, LoaderError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    render(outcome, &mut lock)
}
