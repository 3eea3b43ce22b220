//! The capability set the engine consumes from a provider (spec §6):
//! configure, look up a resource type, refresh, diff, apply.

use crate::diff::Diff;
use crate::error::Error;
use async_trait::async_trait;
use std::sync::Arc;
use terramorph_core::{Config, Diagnostics, HandlerState};

/// A pluggable collaborator that knows how to read and mutate one external
/// system. Treated by the engine as opaque beyond this capability set.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Configures the provider (credentials, endpoints, ...) once, before
    /// any resource type is used. Construction of the config map itself,
    /// where credentials come from, is outside the engine's concerns.
    async fn configure(&self, config: &Config) -> Diagnostics;

    /// Looks up the operations for a resource type. `None` means the type
    /// is not known to this provider (`Kind::UnknownResourceType`).
    fn resource_type(&self, name: &str) -> Option<Arc<dyn ResourceOps>>;
}

/// Per-resource-type operations. An instance is already bound to whatever
/// opaque `Meta` (spec §6) the provider needs to thread through its calls,
/// since it is handed out by [`Provider::resource_type`] rather than
/// constructed independently of a configured provider.
#[async_trait]
pub trait ResourceOps: Send + Sync {
    /// Reconciles `state` against reality, yielding a current observed
    /// state. Error-severity diagnostics terminate the caller's reconcile
    /// with `Kind::RefreshFailed`.
    async fn refresh_without_upgrade(&self, state: HandlerState) -> (HandlerState, Diagnostics);

    /// Computes a structural delta between `state` and the desired
    /// `config`. `Ok(None)` means no work.
    fn diff(&self, state: &HandlerState, config: &Config) -> Result<Option<Diff>, Error>;

    /// Materializes `diff` against `state`, returning the post-apply state.
    async fn apply(&self, state: &HandlerState, diff: &Diff) -> (HandlerState, Diagnostics);

    /// Attribute-name prefixes this resource type always wants dropped
    /// from a diff before the handler decides whether there's real work
    /// (e.g. `aws_s3_bucket`'s `force_destroy`/`acl`). Empty by default.
    fn ignored_attribute_prefixes(&self) -> Vec<String> {
        Vec::new()
    }
}
