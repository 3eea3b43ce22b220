//! An in-memory [`StateStore`] for tests that don't want disk I/O.

use std::collections::BTreeMap;

use async_trait::async_trait;
use terramorph_core::{HandlerState, LogicalId};
use terramorph_storage::{Error, StateStore};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<BTreeMap<String, HandlerState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry as if a prior apply had already written it, without
    /// going through `StateStore::write`.
    pub async fn seed(&self, logical_id: &LogicalId, state: HandlerState) {
        self.states.lock().await.insert(logical_id.as_str().to_string(), state);
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read(&self, logical_id: &LogicalId) -> Result<Option<HandlerState>, Error> {
        Ok(self.states.lock().await.get(logical_id.as_str()).cloned())
    }

    async fn write(&self, logical_id: &LogicalId, state: &HandlerState) -> Result<(), Error> {
        self.states.lock().await.insert(logical_id.as_str().to_string(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_entry_reads_as_none() {
        let store = MemoryStateStore::new();
        assert!(store.read(&LogicalId::new("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seeded_entry_is_visible_to_read() {
        let store = MemoryStateStore::new();
        let mut state = HandlerState::empty();
        state.id = Some("b1".to_string());
        store.seed(&LogicalId::new("bucket"), state.clone()).await;
        assert_eq!(store.read(&LogicalId::new("bucket")).await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = MemoryStateStore::new();
        let mut state = HandlerState::empty();
        state.attributes.insert("acl".to_string(), terramorph_core::Value::from("private"));
        store.write(&LogicalId::new("bucket"), &state).await.unwrap();
        assert_eq!(store.read(&LogicalId::new("bucket")).await.unwrap(), Some(state));
    }
}
