//! Concurrent topological evaluator: invokes a user callback per vertex
//! once all predecessors have returned, obeying the DAG's edges.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;

use terramorph_core::{Dag, Diagnostics};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::Error as RuntimeError;

/// Boxed future a [`Walker`] callback returns.
pub type CallbackFuture = Pin<Box<dyn Future<Output = Diagnostics> + Send>>;

/// Type-erased per-vertex callback.
pub type Callback<V> = Arc<dyn Fn(V) -> CallbackFuture + Send + Sync>;

/// Evaluates a [`Dag`] by invoking `callback(v)` exactly once per vertex
/// (except vertices marked pre-completed, e.g. a synthetic root), obeying:
/// for every edge `(u, v)`, `callback(u)` has returned before `callback(v)`
/// starts.
pub struct Walker<V: Eq + Hash + Clone + Send + Sync + fmt::Debug + 'static> {
    dag: Option<Dag<V>>,
    callback: Callback<V>,
    pre_completed: Arc<dyn Fn(&V) -> bool + Send + Sync>,
    max_in_flight: Option<usize>,
}

impl<V: Eq + Hash + Clone + Send + Sync + fmt::Debug + 'static> Walker<V> {
    pub fn new(callback: Callback<V>) -> Self {
        Self {
            dag: None,
            callback,
            pre_completed: Arc::new(|_| false),
            max_in_flight: None,
        }
    }

    /// Marks vertices for which `f` returns true as already complete: no
    /// callback is invoked for them, but their outgoing edges make
    /// successors eligible from the start (the synthetic root, spec §4.2).
    pub fn with_pre_completed(mut self, f: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        self.pre_completed = Arc::new(f);
        self
    }

    /// Bounds the number of callbacks the walker runs concurrently. `None`
    /// (the default) means bounded only by predecessor completion.
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Registers the current target graph. May be called once; a second
    /// call replaces the graph evaluated by the next `wait`.
    pub fn update(&mut self, dag: Dag<V>) {
        self.dag = Some(dag);
    }

    /// Blocks until every vertex has either been evaluated or skipped
    /// because one of its transitive predecessors returned an
    /// error-severity diagnostic. Never returns partial success without
    /// also returning the error.
    pub async fn wait(&mut self, cancel: CancellationToken) -> Diagnostics {
        let dag = match self.dag.take() {
            Some(dag) => dag,
            None => return Diagnostics::new(),
        };
        if dag.is_empty() {
            return Diagnostics::new();
        }

        let mut diagnostics = Diagnostics::new();
        let mut done: HashSet<V> = HashSet::new();
        for v in dag.vertices() {
            if (self.pre_completed)(v) {
                done.insert(v.clone());
            }
        }

        let mut pending: HashMap<V, usize> = HashMap::new();
        for v in dag.vertices() {
            if done.contains(v) {
                continue;
            }
            let count = dag.predecessors(v).into_iter().filter(|p| !done.contains(*p)).count();
            pending.insert(v.clone(), count);
        }

        let mut ready: VecDeque<V> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(v, _)| v.clone())
            .collect();

        let semaphore = self.max_in_flight.map(|n| Arc::new(tokio::sync::Semaphore::new(n.max(1))));
        let mut join_set: JoinSet<(V, Diagnostics)> = JoinSet::new();
        let mut task_vertex: HashMap<tokio::task::Id, V> = HashMap::new();

        loop {
            while !cancel.is_cancelled() {
                let Some(v) = ready.pop_front() else { break };
                if done.contains(&v) {
                    continue; // became skipped while queued
                }
                pending.remove(&v);
                let callback = self.callback.clone();
                let permit = match &semaphore {
                    Some(sem) => Some(sem.clone().acquire_owned().await.expect("walker semaphore never closes")),
                    None => None,
                };
                let vertex_for_task = v.clone();
                let handle = join_set.spawn(async move {
                    let _permit = permit;
                    let diags = callback(vertex_for_task.clone()).await;
                    (vertex_for_task, diags)
                });
                task_vertex.insert(handle.id(), v);
            }

            if join_set.is_empty() {
                break;
            }

            match join_set.join_next_with_id().await {
                Some(Ok((id, (v, diags)))) => {
                    task_vertex.remove(&id);
                    let had_error = diags.has_error();
                    diagnostics.extend(diags);
                    done.insert(v.clone());
                    if had_error {
                        skip_descendants(&dag, &v, &mut done, &mut pending);
                    } else {
                        for succ in dag.successors(&v) {
                            if let Some(count) = pending.get_mut(succ) {
                                *count -= 1;
                                if *count == 0 {
                                    ready.push_back(succ.clone());
                                }
                            }
                        }
                    }
                }
                Some(Err(join_err)) => {
                    let id = join_err.id();
                    if let Some(v) = task_vertex.remove(&id) {
                        tracing::warn!(vertex = ?v, error = %join_err, "walker callback panicked");
                        diagnostics.push(
                            RuntimeError::CallbackPanicked {
                                vertex: format!("{v:?}"),
                                detail: join_err.to_string(),
                            }
                            .into(),
                        );
                        done.insert(v.clone());
                        skip_descendants(&dag, &v, &mut done, &mut pending);
                    }
                }
                None => break,
            }
        }

        if cancel.is_cancelled() {
            diagnostics.push(RuntimeError::Cancelled.into());
        } else if !pending.is_empty() {
            // Defensive: a validated, acyclic DAG never reaches this branch.
            diagnostics.push(terramorph_core::Diagnostic {
                severity: terramorph_core::Severity::Error,
                kind: None,
                summary: "walker stalled with unreachable vertices".to_string(),
                detail: format!("{} vertices never became eligible", pending.len()),
            });
        }

        diagnostics
    }
}

fn skip_descendants<V: Eq + Hash + Clone>(
    dag: &Dag<V>,
    failed: &V,
    done: &mut HashSet<V>,
    pending: &mut HashMap<V, usize>,
) {
    let mut stack: Vec<V> = dag.successors(failed).into_iter().cloned().collect();
    while let Some(v) = stack.pop() {
        if done.contains(&v) {
            continue;
        }
        done.insert(v.clone());
        pending.remove(&v);
        stack.extend(dag.successors(&v).into_iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use terramorph_core::{Diagnostic, Kind, Severity};
    use tokio::sync::Mutex as AsyncMutex;

    fn diag_ok() -> Diagnostics {
        Diagnostics::new()
    }

    fn diag_err() -> Diagnostics {
        let mut d = Diagnostics::new();
        d.push(Diagnostic {
            severity: Severity::Error,
            kind: Some(Kind::ApplyFailed),
            summary: "boom".to_string(),
            detail: "boom".to_string(),
        });
        d
    }

    #[tokio::test]
    async fn empty_graph_returns_immediately() {
        let called = Arc::new(AtomicUsize::new(0));
        let called2 = called.clone();
        let mut walker: Walker<&str> = Walker::new(Arc::new(move |_v| {
            called2.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { diag_ok() })
        }));
        walker.update(Dag::new());
        let diags = walker.wait(CancellationToken::new()).await;
        assert!(diags.is_empty());
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn respects_edge_ordering() {
        let order = Arc::new(AsyncMutex::new(Vec::new()));
        let order2 = order.clone();
        let mut dag = Dag::new();
        dag.connect("a", "b");
        dag.connect("a", "c");
        dag.connect("b", "d");
        dag.connect("c", "d");

        let mut walker: Walker<&str> = Walker::new(Arc::new(move |v: &'static str| {
            let order = order2.clone();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(if v == "a" { 20 } else { 1 })).await;
                order.lock().await.push(v);
                diag_ok()
            })
        }));
        walker.update(dag);
        let diags = walker.wait(CancellationToken::new()).await;
        assert!(!diags.has_error());
        let order = order.lock().await;
        assert_eq!(order[0], "a");
        assert_eq!(*order.last().unwrap(), "d");
    }

    #[tokio::test]
    async fn error_skips_transitive_successors() {
        let ran = Arc::new(AsyncMutex::new(Vec::new()));
        let ran2 = ran.clone();
        let mut dag = Dag::new();
        dag.connect("a", "b");
        dag.connect("b", "c");
        dag.connect("a", "x"); // independent branch, must still run

        let mut walker: Walker<&str> = Walker::new(Arc::new(move |v: &'static str| {
            let ran = ran2.clone();
            Box::pin(async move {
                ran.lock().await.push(v);
                if v == "b" {
                    diag_err()
                } else {
                    diag_ok()
                }
            })
        }));
        walker.update(dag);
        let diags = walker.wait(CancellationToken::new()).await;
        assert!(diags.has_error());
        let ran = ran.lock().await;
        assert!(ran.contains(&"a"));
        assert!(ran.contains(&"b"));
        assert!(!ran.contains(&"c"), "c is a successor of failed b and must be skipped");
        assert!(ran.contains(&"x"), "x does not depend on b and must still run");
    }

    #[tokio::test]
    async fn pre_completed_root_unblocks_successors_without_a_callback() {
        let ran = Arc::new(AsyncMutex::new(Vec::new()));
        let ran2 = ran.clone();
        let mut dag = Dag::new();
        dag.connect(0, 1);
        dag.connect(0, 2);

        let mut walker: Walker<i32> = Walker::new(Arc::new(move |v: i32| {
            let ran = ran2.clone();
            Box::pin(async move {
                ran.lock().await.push(v);
                diag_ok()
            })
        }))
        .with_pre_completed(|v| *v == 0);
        walker.update(dag);
        let diags = walker.wait(CancellationToken::new()).await;
        assert!(!diags.has_error());
        let ran = ran.lock().await;
        assert!(!ran.contains(&0), "root never gets a callback");
        assert!(ran.contains(&1));
        assert!(ran.contains(&2));
    }

    #[tokio::test]
    async fn cancellation_stops_new_callbacks_but_drains_in_flight() {
        let mut dag = Dag::new();
        dag.connect("a", "b");
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        let mut walker: Walker<&str> = Walker::new(Arc::new(move |v: &'static str| {
            let cancel_clone = cancel_clone.clone();
            Box::pin(async move {
                if v == "a" {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    cancel_clone.cancel();
                }
                diag_ok()
            })
        }));
        walker.update(dag);
        let diags = walker.wait(cancel).await;
        assert!(diags.has_error());
        assert!(diags.iter().any(|d| d.kind == Some(Kind::Cancelled)));
    }
}
