//! The per-resource handler data model (spec §3) and the vertex type the
//! manifest's DAG is built over.

use crate::value::{Config, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable, manifest-unique name. Also the state-store key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LogicalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A vertex of the manifest's DAG: either a handler or the synthetic root
/// sentinel dependency-free handlers attach to. Modeled as an explicit enum
/// rather than overloading the handler-vertex value space with a magic
/// scalar (spec §9, "Root sentinel").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Vertex {
    Root,
    Resource(LogicalId),
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Root => f.write_str("<root>"),
            Vertex::Resource(id) => write!(f, "{id}"),
        }
    }
}

/// Last observed serialized attributes plus a provider-assigned physical
/// ID. Owned by the handler; replaced on every successful apply; read from
/// the state store before the first refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerState {
    /// Provider-assigned identifier. `None` until the first successful
    /// apply (or until seeded by the caller for an import-like flow).
    pub id: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

impl HandlerState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Structural field access used by the reference resolver's
    /// `ResourceState` section: `ID` is the physical ID, anything else is
    /// looked up in `attributes`.
    pub fn field(&self, name: &str) -> Option<Value> {
        if name == "ID" {
            return self.id.clone().map(Value::String);
        }
        self.attributes.get(name).cloned()
    }
}

/// One per managed resource.
#[derive(Debug, Clone)]
pub struct Handler {
    pub logical_id: LogicalId,
    pub resource_type: String,
    pub config: Config,
    pub state: HandlerState,
}

impl Handler {
    pub fn new(logical_id: impl Into<LogicalId>, resource_type: impl Into<String>, config: Config) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type: resource_type.into(),
            config,
            state: HandlerState::empty(),
        }
    }

    pub fn vertex(&self) -> Vertex {
        Vertex::Resource(self.logical_id.clone())
    }
}
