//! Structural errors raised while assembling a [`crate::Manifest`], as
//! opposed to the reconcile-time diagnostics raised once it is applied.

use terramorph_core::LogicalId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("logical ID `{0}` is already used by another handler in this manifest")]
    DuplicateLogicalId(LogicalId),

    #[error("manifest is frozen: handlers cannot be added after the first `apply`")]
    ManifestFrozen,
}
