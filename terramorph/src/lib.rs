//! A declarative infrastructure reconciliation engine.
//!
//! A [`Manifest`] is a named collection of [`Handler`](terramorph_core::Handler)s,
//! each describing one piece of desired external state by resource type, a
//! logical ID, and a config map whose string values may symbolically
//! reference a sibling handler's config or state (`<name>.ResourceConfig.<field>`
//! / `<name>.ResourceState.<field>`). `Manifest::apply` resolves those
//! references into a dependency DAG, then walks it with bounded
//! concurrency, driving each handler through refresh → diff → apply →
//! re-diff against a pluggable [`Provider`](terramorph_provider::Provider)
//! and [`StateStore`](terramorph_storage::StateStore).
//!
//! This crate is the facade: it owns the handler set and the walk, but
//! knows nothing about how a provider talks to the outside world, how
//! state is persisted on disk, or how a manifest gets built from a config
//! file: those are `terramorph-provider`, `terramorph-storage`, and the
//! caller's own driver, respectively.
//!
//! ```no_run
//! use std::sync::Arc;
//! use terramorph::Manifest;
//! use terramorph_core::{Config, Handler, Value};
//! use terramorph_storage::FileStateStore;
//! use tokio_util::sync::CancellationToken;
//! # use terramorph_provider::Provider;
//! # fn example_provider() -> Arc<dyn Provider> { unimplemented!() }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! tracing_subscriber::fmt::init();
//!
//! let mut manifest = Manifest::new();
//! manifest.add_handler(Handler::new(
//!     "bucket",
//!     "aws_s3_bucket",
//!     Config::from([("name".to_string(), Value::from("my-bucket"))]),
//! ))?;
//!
//! let provider = example_provider();
//! let state_store = Arc::new(FileStateStore::default_location()?);
//! let diagnostics = manifest.apply(provider, state_store, CancellationToken::new()).await;
//! if diagnostics.has_error() {
//!     for d in diagnostics.iter() {
//!         tracing::error!(%d, "reconcile reported an error");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod manifest;

pub use error::Error;
pub use manifest::Manifest;

pub use terramorph_core::{
    Diagnostic, Diagnostics, EngineConfig, Handler, HandlerState, Kind, LogicalId, Severity,
    Value, Vertex,
};
pub use terramorph_provider::Provider;
pub use terramorph_storage::StateStore;
