pub(crate) mod report;
pub(crate) mod summary;

use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::source::SourceError;

/// Failure of a subcommand, reported once at the top level.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("exactly one of --{0}-version, --{0}-branch or --{0}-path is required")]
    Selector(&'static str),
    #[error("could not write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Print `rendered` to stdout, or write it to `path` when one is given.
pub(crate) fn write_output(path: Option<&Path>, rendered: &str) -> Result<(), CommandError> {
    match path {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|source| CommandError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "report written");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
