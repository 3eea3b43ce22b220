//! Abstract persistence contract: read/write of per-logical-ID blobs.

use crate::error::Error;
use async_trait::async_trait;
use terramorph_core::{HandlerState, LogicalId};

/// Safe for concurrent `read`/`write` across distinct logical IDs. Need not
/// be safe for concurrent access to the *same* ID, since the walker guarantees
/// single-writer per ID by construction.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// A missing entry is `Ok(None)`, never an error.
    async fn read(&self, logical_id: &LogicalId) -> Result<Option<HandlerState>, Error>;

    async fn write(&self, logical_id: &LogicalId, state: &HandlerState) -> Result<(), Error>;
}
