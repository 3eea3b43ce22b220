//! The per-resource reconcile protocol (spec §4.4):
//! `Resolve -> LoadState -> Refresh -> Diff -> [Filter -> Decide] -> (NoOp | Apply -> Persist)`.

use async_trait::async_trait;
use terramorph_core::{scan_references, Diagnostic, Diagnostics, Handler, Kind, Section, Value};
use terramorph_provider::Provider;
use terramorph_storage::StateStore;
use tracing::Instrument;

/// Lets a handler resolve symbolic references into sibling handlers'
/// config/state without the reconcile protocol knowing how the manifest
/// stores or locks its handler set.
#[async_trait]
pub trait SiblingLookup: Send + Sync {
    async fn resolve(&self, name: &str, section: Section, field: &str) -> Option<Value>;
}

fn summarize(diagnostics: &Diagnostics) -> String {
    diagnostics
        .iter()
        .map(|d| d.summary.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Drives one handler through the full reconcile protocol.
pub async fn reconcile(
    handler: &mut Handler,
    provider: &dyn Provider,
    state_store: &dyn StateStore,
    siblings: &dyn SiblingLookup,
    strict_convergence: bool,
) -> Diagnostics {
    let span = tracing::info_span!(
        "reconcile",
        logical_id = %handler.logical_id,
        resource_type = %handler.resource_type,
    );
    reconcile_inner(handler, provider, state_store, siblings, strict_convergence)
        .instrument(span)
        .await
}

async fn reconcile_inner(
    handler: &mut Handler,
    provider: &dyn Provider,
    state_store: &dyn StateStore,
    siblings: &dyn SiblingLookup,
    strict_convergence: bool,
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    // --- Resolve ---
    let references = scan_references(&handler.config);
    for (key, reference) in references {
        match siblings.resolve(&reference.name, reference.section, &reference.field).await {
            Some(value) => {
                handler.config.insert(key, value);
            }
            None => {
                diagnostics.push(Diagnostic::error(
                    Kind::UnresolvedReference,
                    format!("unresolved reference `{reference}`"),
                    format!("config key `{key}` on `{}` could not be resolved", handler.logical_id),
                ));
                return diagnostics;
            }
        }
    }

    // --- LoadState ---
    match state_store.read(&handler.logical_id).await {
        Ok(Some(state)) => handler.state = state,
        Ok(None) => {
            tracing::debug!("no prior state, starting from an empty record");
        }
        Err(err) => {
            diagnostics.push(Diagnostic::error(
                Kind::StateReadFailed,
                format!("failed to read state for `{}`", handler.logical_id),
                err.to_string(),
            ));
            return diagnostics;
        }
    }
    let pre_refresh_state = handler.state.clone();

    let ops = match provider.resource_type(&handler.resource_type) {
        Some(ops) => ops,
        None => {
            diagnostics.push(Diagnostic::error(
                Kind::UnknownResourceType,
                format!("resource type `{}` is not known to the provider", handler.resource_type),
                handler.logical_id.to_string(),
            ));
            return diagnostics;
        }
    };

    // --- Refresh ---
    tracing::info!("refreshing state");
    let (refreshed, refresh_diags) = ops.refresh_without_upgrade(handler.state.clone()).await;
    if refresh_diags.has_error() {
        diagnostics.push(Diagnostic::error(
            Kind::RefreshFailed,
            format!("refresh failed for `{}`", handler.logical_id),
            summarize(&refresh_diags),
        ));
        diagnostics.extend(refresh_diags);
        return diagnostics;
    }
    diagnostics.extend(refresh_diags);
    handler.state = refreshed;

    // --- Diff ---
    tracing::info!("diffing state and config");
    let diff = match ops.diff(&handler.state, &handler.config) {
        Ok(diff) => diff,
        Err(err) => {
            diagnostics.push(Diagnostic::error(
                Kind::DiffFailed,
                format!("diff failed for `{}`", handler.logical_id),
                err.to_string(),
            ));
            return diagnostics;
        }
    };
    let unfiltered = match diff {
        Some(d) => d,
        None => {
            tracing::debug!("no diff, nothing to do");
            return diagnostics;
        }
    };

    // --- Filter / Decide ---
    let mut filtered = unfiltered.clone();
    filtered.filter_ignored(&ops.ignored_attribute_prefixes());
    if filtered.is_empty() {
        tracing::debug!("diff fully covered by the ignore list, nothing to do");
        return diagnostics;
    }
    tracing::info!(
        diff_keys = ?filtered.attributes.keys().collect::<Vec<_>>(),
        "applying changes",
    );

    // --- Apply ---
    // Per spec: apply sees the pre-refresh state and the *unfiltered* diff,
    // since the provider needs every attribute to materialize the change.
    let (post_apply, apply_diags) = ops.apply(&pre_refresh_state, &unfiltered).await;
    if apply_diags.has_error() {
        diagnostics.push(Diagnostic::error(
            Kind::ApplyFailed,
            format!("apply failed for `{}`", handler.logical_id),
            summarize(&apply_diags),
        ));
        diagnostics.extend(apply_diags);
        return diagnostics;
    }
    diagnostics.extend(apply_diags);

    // --- Persist ---
    if let Err(err) = state_store.write(&handler.logical_id, &post_apply).await {
        diagnostics.push(Diagnostic::error(
            Kind::StateWriteFailed,
            format!("failed to persist state for `{}`", handler.logical_id),
            err.to_string(),
        ));
        return diagnostics;
    }
    handler.state = post_apply;

    // --- Re-diff (StrictConvergence, spec §9) ---
    if strict_convergence {
        match ops.diff(&handler.state, &handler.config) {
            Ok(Some(mut second)) => {
                second.filter_ignored(&ops.ignored_attribute_prefixes());
                if !second.is_empty() {
                    diagnostics.push(Diagnostic::error(
                        Kind::Divergent,
                        format!("`{}` did not converge after apply", handler.logical_id),
                        format!("{} attribute(s) still differ from config", second.attributes.len()),
                    ));
                }
            }
            Ok(None) => {}
            Err(err) => {
                diagnostics.push(Diagnostic::error(
                    Kind::DiffFailed,
                    format!("re-diff failed for `{}`", handler.logical_id),
                    err.to_string(),
                ));
            }
        }
    }

    diagnostics
}
