//! Shared types for the terramorph reconciliation engine: the dependency
//! DAG, the diagnostics records the walker and reconcile protocol return,
//! the symbolic reference grammar, and the handler data model.
//!
//! This crate is client-less: it knows nothing about how a provider talks
//! to the outside world or how state is persisted. Those capability sets
//! live in `terramorph-provider` and `terramorph-storage`.

pub mod config;
pub mod dag;
pub mod diagnostics;
pub mod handler;
pub mod reference;
pub mod value;

pub use config::EngineConfig;
pub use dag::{CycleDetected, Dag};
pub use diagnostics::{Diagnostic, Diagnostics, Kind, Severity};
pub use handler::{Handler, HandlerState, LogicalId, Vertex};
pub use reference::{scan_references, Reference, Section};
pub use value::{Config, Value};
