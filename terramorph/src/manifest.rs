//! Owns the handler set, builds the dependency DAG from symbolic
//! references, and drives the walker (spec §4.5).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use terramorph_core::{
    scan_references, Dag, Diagnostic, Diagnostics, EngineConfig, Handler, Kind, LogicalId,
    Section, Value, Vertex,
};
use terramorph_provider::Provider;
use terramorph_runtime::{reconcile, Callback, SiblingLookup, Walker};
use terramorph_storage::StateStore;

use crate::error::Error;

/// Mapping from logical ID to handler plus the DAG over the same vertex
/// set. Constructed empty, populated by the driver, frozen at the first
/// call to [`Manifest::apply`] (no handler mutation thereafter).
///
/// Each handler is behind its own `tokio::sync::Mutex` rather than one
/// manifest-scoped lock around every callback body: the walker's
/// topological guarantee already makes a dependent's reconcile causally
/// after its dependency's, so the per-handler lock only needs to protect a
/// handler's own `Config`/`State` fields from a concurrent sibling read;
/// see `DESIGN.md` for why this is chosen over the single coarse mutex the
/// original source uses.
pub struct Manifest {
    handlers: HashMap<LogicalId, Arc<Mutex<Handler>>>,
    frozen: AtomicBool,
    config: EngineConfig,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            frozen: AtomicBool::new(false),
            config,
        }
    }

    /// Inserts a handler. Fails with [`Error::DuplicateLogicalId`] if
    /// `handler.logical_id` is already used, or [`Error::ManifestFrozen`]
    /// if `apply` has already run once.
    pub fn add_handler(&mut self, handler: Handler) -> Result<(), Error> {
        if self.frozen.load(Ordering::SeqCst) {
            return Err(Error::ManifestFrozen);
        }
        if self.handlers.contains_key(&handler.logical_id) {
            return Err(Error::DuplicateLogicalId(handler.logical_id));
        }
        self.handlers
            .insert(handler.logical_id.clone(), Arc::new(Mutex::new(handler)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Builds the DAG from handler references, validates it, then drives
    /// every handler through the reconcile protocol in topological order.
    /// Returns the union of every diagnostic raised along the way.
    pub async fn apply(
        &self,
        provider: Arc<dyn Provider>,
        state_store: Arc<dyn StateStore>,
        cancel: CancellationToken,
    ) -> Diagnostics {
        self.frozen.store(true, Ordering::SeqCst);

        let (dag, mut diagnostics) = self.build_dag();
        if diagnostics.has_error() {
            return diagnostics;
        }

        let mut dag = dag;
        dag.transitive_reduction();
        if dag.validate().is_err() {
            diagnostics.push(Diagnostic::error(
                Kind::CyclicManifest,
                "manifest reference graph contains a cycle",
                "a handler (directly or transitively) references its own output",
            ));
            return diagnostics;
        }

        let snapshot: Arc<HashMap<LogicalId, Arc<Mutex<Handler>>>> = Arc::new(self.handlers.clone());
        let siblings = Arc::new(ManifestSiblings {
            handlers: snapshot.clone(),
        });
        let strict_convergence = self.config.strict_convergence;

        let callback: Callback<Vertex> = Arc::new(move |vertex: Vertex| {
            let handlers = snapshot.clone();
            let provider = provider.clone();
            let state_store = state_store.clone();
            let siblings = siblings.clone();
            Box::pin(async move {
                let Vertex::Resource(id) = vertex else {
                    return Diagnostics::new();
                };
                let Some(handler_lock) = handlers.get(&id) else {
                    return Diagnostics::new();
                };
                let mut handler = handler_lock.lock().await;
                reconcile(
                    &mut handler,
                    provider.as_ref(),
                    state_store.as_ref(),
                    siblings.as_ref(),
                    strict_convergence,
                )
                .await
            })
        });

        let mut walker: Walker<Vertex> = Walker::new(callback)
            .with_pre_completed(|v| matches!(v, Vertex::Root))
            .with_max_in_flight(self.config.max_in_flight);
        walker.update(dag);
        diagnostics.extend(walker.wait(cancel).await);
        diagnostics
    }

    /// Builds the vertex/edge set of spec §4.5 step 1: every handler
    /// becomes a vertex, every reference becomes an edge `referenced ->
    /// referencing`, and a handler with no references is attached to the
    /// synthetic root.
    fn build_dag(&self) -> (Dag<Vertex>, Diagnostics) {
        let mut dag = Dag::new();
        let mut diagnostics = Diagnostics::new();

        for (logical_id, handler_lock) in &self.handlers {
            let vertex = Vertex::Resource(logical_id.clone());
            dag.add(vertex.clone());

            // `try_lock` is sound here: `apply` is the only caller and no
            // reconcile has started yet, so every handler is uncontended.
            let config = handler_lock
                .try_lock()
                .expect("no reconcile runs before the DAG is built")
                .config
                .clone();
            let references = scan_references(&config);

            if references.is_empty() {
                dag.connect(Vertex::Root, vertex);
                continue;
            }

            for (key, reference) in references {
                let referenced = LogicalId::new(reference.name.clone());
                if !self.handlers.contains_key(&referenced) {
                    diagnostics.push(Diagnostic::error(
                        Kind::UnresolvedReference,
                        format!("unresolved reference `{reference}`"),
                        format!("config key `{key}` on `{logical_id}` names no handler `{}`", reference.name),
                    ));
                    continue;
                }
                dag.connect(Vertex::Resource(referenced), vertex.clone());
            }
        }

        (dag, diagnostics)
    }
}

struct ManifestSiblings {
    handlers: Arc<HashMap<LogicalId, Arc<Mutex<Handler>>>>,
}

#[async_trait]
impl SiblingLookup for ManifestSiblings {
    async fn resolve(&self, name: &str, section: Section, field: &str) -> Option<Value> {
        let handler_lock = self.handlers.get(&LogicalId::new(name))?;
        let handler = handler_lock.lock().await;
        match section {
            Section::ResourceConfig => handler.config.get(field).cloned(),
            Section::ResourceState => handler.state.field(field),
        }
    }
}
