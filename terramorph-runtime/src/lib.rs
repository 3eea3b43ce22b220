//! The concurrent topological walker and the per-handler reconcile driver.
//!
//! This crate knows how to evaluate a [`terramorph_core::Dag`] with bounded
//! concurrency and how to drive one handler through the reconcile protocol
//! against a [`terramorph_provider::Provider`] and a
//! [`terramorph_storage::StateStore`]. It does not know how a manifest's
//! handler set is assembled or locked; that lives in the `terramorph`
//! facade crate, which is the only consumer of both this crate and
//! `terramorph-core`'s reference resolver.

mod error;
mod reconcile;
mod walker;

pub use error::Error;
pub use reconcile::{reconcile, SiblingLookup};
pub use walker::{Callback, CallbackFuture, Walker};
