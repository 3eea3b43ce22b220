use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum Error {
    #[error("provider refused its configuration: {0}")]
    ConfigureFailed(String),
    #[error("resource type `{0}` is not known to this provider")]
    UnknownResourceType(String),
    #[error("refresh failed: {0}")]
    RefreshFailed(String),
    #[error("diff computation failed: {0}")]
    DiffFailed(String),
    #[error("apply failed: {0}")]
    ApplyFailed(String),
}
