//! Test doubles for exercising the terramorph reconciliation engine
//! end to end without a real provider or disk-backed state store. Pattern:
//! the teacher's own `kube-test` dev-support crate.

mod fake_provider;
mod memory_store;

pub use fake_provider::{FakeProvider, ScriptedResourceOps};
pub use memory_store::MemoryStateStore;
