use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not determine a home directory to locate the default state directory")]
    NoHomeDirectory,
    #[error("failed to create state directory {path}")]
    CreateDir { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to read state file {path}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse state file {path}")]
    Deserialize { path: PathBuf, #[source] source: serde_json::Error },
    #[error("failed to serialize state for {logical_id}")]
    Serialize { logical_id: String, #[source] source: serde_json::Error },
    #[error("failed to write state file {path}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to rename {from} into place as {to}")]
    Rename { from: PathBuf, to: PathBuf, #[source] source: std::io::Error },
}
