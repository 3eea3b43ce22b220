//! An in-memory [`Provider`] whose resource types are registered with
//! scripted refresh/diff/apply behavior, for driving the engine end to end
//! without a real cloud API on the other side.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use terramorph_core::{Config, Diagnostic, Diagnostics, HandlerState, Kind, Value};
use terramorph_provider::{AttributeDiff, Diff, Error, Provider, ResourceOps};

type RefreshFn = Arc<dyn Fn(HandlerState) -> (HandlerState, Diagnostics) + Send + Sync>;
type DiffFn = Arc<dyn Fn(&HandlerState, &Config) -> Result<Option<Diff>, Error> + Send + Sync>;
type ApplyFn = Arc<dyn Fn(&HandlerState, &Diff) -> (HandlerState, Diagnostics) + Send + Sync>;

/// A [`ResourceOps`] whose three operations are plain closures, so a test
/// can script exactly the refresh/diff/apply sequence a scenario needs
/// without hand-rolling a new `impl ResourceOps` each time.
#[derive(Clone)]
pub struct ScriptedResourceOps {
    refresh: RefreshFn,
    diff: DiffFn,
    apply: ApplyFn,
    ignored_attribute_prefixes: Vec<String>,
}

impl ScriptedResourceOps {
    /// Behaves like creating a resource from scratch: refresh is a no-op,
    /// diff is the whole config while `state.id` is unset (creation) and
    /// `None` once it is set, apply assigns `physical_id` and copies every
    /// diffed attribute into state.
    pub fn creating(physical_id: impl Into<String>) -> Self {
        let physical_id = physical_id.into();
        Self {
            refresh: Arc::new(|state| (state, Diagnostics::new())),
            diff: Arc::new(|state, config| {
                if state.id.is_some() {
                    return Ok(None);
                }
                let mut d = Diff::new();
                for (k, v) in config {
                    d.attributes.insert(k.clone(), AttributeDiff { old: None, new: Some(v.clone()) });
                }
                Ok(Some(d))
            }),
            apply: Arc::new(move |_state, diff| {
                let mut state = HandlerState::empty();
                state.id = Some(physical_id.clone());
                for (k, ad) in &diff.attributes {
                    if let Some(v) = &ad.new {
                        state.attributes.insert(k.clone(), v.clone());
                    }
                }
                (state, Diagnostics::new())
            }),
            ignored_attribute_prefixes: Vec::new(),
        }
    }

    /// A resource type that never converges: every diff (including the
    /// post-apply re-diff) reports `drifting_field` as out of sync,
    /// regardless of what apply does. Used to exercise `Kind::Divergent`.
    pub fn diverging(physical_id: impl Into<String>) -> Self {
        let physical_id = physical_id.into();
        Self {
            refresh: Arc::new(|state| (state, Diagnostics::new())),
            diff: Arc::new(|_state, _config| {
                let mut d = Diff::new();
                d.attributes.insert(
                    "drifting_field".to_string(),
                    AttributeDiff { old: Some(Value::from("observed")), new: Some(Value::from("desired")) },
                );
                Ok(Some(d))
            }),
            apply: Arc::new(move |state, _diff| {
                let mut state = state.clone();
                state.id.get_or_insert_with(|| physical_id.clone());
                (state, Diagnostics::new())
            }),
            ignored_attribute_prefixes: Vec::new(),
        }
    }

    /// Refresh returns an error-severity diagnostic; diff/apply are never
    /// reached in a well-behaved reconcile. Used to exercise `RefreshFailed`.
    pub fn failing_refresh(summary: impl Into<String>) -> Self {
        let summary = summary.into();
        Self {
            refresh: Arc::new(move |state| {
                let mut diags = Diagnostics::new();
                diags.push(Diagnostic::error(Kind::RefreshFailed, summary.clone(), "scripted failure"));
                (state, diags)
            }),
            diff: Arc::new(|_state, _config| Ok(None)),
            apply: Arc::new(|state, _diff| (state.clone(), Diagnostics::new())),
            ignored_attribute_prefixes: Vec::new(),
        }
    }

    /// Diff returns `Err`. Used to exercise `DiffFailed`.
    pub fn failing_diff(summary: impl Into<String>) -> Self {
        let summary = summary.into();
        Self {
            refresh: Arc::new(|state| (state, Diagnostics::new())),
            diff: Arc::new(move |_state, _config| Err(Error::DiffFailed(summary.clone()))),
            apply: Arc::new(|state, _diff| (state.clone(), Diagnostics::new())),
            ignored_attribute_prefixes: Vec::new(),
        }
    }

    /// Apply returns an error-severity diagnostic. Used to exercise
    /// `ApplyFailed`.
    pub fn failing_apply(summary: impl Into<String>) -> Self {
        let summary = summary.into();
        Self {
            refresh: Arc::new(|state| (state, Diagnostics::new())),
            diff: Arc::new(|_state, config| {
                let mut d = Diff::new();
                for (k, v) in config {
                    d.attributes.insert(k.clone(), AttributeDiff { old: None, new: Some(v.clone()) });
                }
                Ok(Some(d))
            }),
            apply: Arc::new(move |state, _diff| {
                let mut diags = Diagnostics::new();
                diags.push(Diagnostic::error(Kind::ApplyFailed, summary.clone(), "scripted failure"));
                (state.clone(), diags)
            }),
            ignored_attribute_prefixes: Vec::new(),
        }
    }

    /// Attaches a per-type ignored-attribute-prefix list, mirroring the
    /// original's `aws_s3_bucket: [force_destroy, acl]` /
    /// `aws_iam_role: [force_detach_policies]` entries.
    pub fn with_ignored_attribute_prefixes(mut self, prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_attribute_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl ResourceOps for ScriptedResourceOps {
    async fn refresh_without_upgrade(&self, state: HandlerState) -> (HandlerState, Diagnostics) {
        (self.refresh)(state)
    }

    fn diff(&self, state: &HandlerState, config: &Config) -> Result<Option<Diff>, Error> {
        (self.diff)(state, config)
    }

    async fn apply(&self, state: &HandlerState, diff: &Diff) -> (HandlerState, Diagnostics) {
        (self.apply)(state, diff)
    }

    fn ignored_attribute_prefixes(&self) -> Vec<String> {
        self.ignored_attribute_prefixes.clone()
    }
}

/// An in-memory [`Provider`] whose resource types are registered up front
/// with [`FakeProvider::with_resource_type`].
#[derive(Default)]
pub struct FakeProvider {
    resource_types: HashMap<String, Arc<dyn ResourceOps>>,
    configure_diagnostics: Diagnostics,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_type(mut self, name: impl Into<String>, ops: impl ResourceOps + 'static) -> Self {
        self.resource_types.insert(name.into(), Arc::new(ops));
        self
    }

    /// Scripts `configure` to return the given diagnostics (e.g. a single
    /// `Kind::ProviderConfigFailed` error) instead of succeeding silently.
    pub fn with_configure_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.configure_diagnostics = diagnostics;
        self
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn configure(&self, _config: &Config) -> Diagnostics {
        self.configure_diagnostics.clone()
    }

    fn resource_type(&self, name: &str) -> Option<Arc<dyn ResourceOps>> {
        self.resource_types.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creating_ops_diffs_until_id_is_set() {
        let ops = ScriptedResourceOps::creating("b1");
        let config = Config::from([("name".to_string(), Value::from("bucket"))]);
        let empty = HandlerState::empty();
        let diff = ops.diff(&empty, &config).unwrap().expect("creation diff");
        assert!(!diff.attributes.is_empty());

        let (state, diags) = ops.apply(&empty, &diff).await;
        assert!(!diags.has_error());
        assert_eq!(state.id.as_deref(), Some("b1"));
        assert!(ops.diff(&state, &config).unwrap().is_none());
    }

    #[tokio::test]
    async fn diverging_ops_never_converges() {
        let ops = ScriptedResourceOps::diverging("x1");
        let config = Config::new();
        let (state, _) = ops.apply(&HandlerState::empty(), &Diff::new()).await;
        let second_diff = ops.diff(&state, &config).unwrap();
        assert!(second_diff.is_some());
    }

    #[tokio::test]
    async fn fake_provider_looks_up_registered_types_only() {
        let provider = FakeProvider::new().with_resource_type("aws_s3_bucket", ScriptedResourceOps::creating("b1"));
        assert!(provider.resource_type("aws_s3_bucket").is_some());
        assert!(provider.resource_type("aws_iam_role").is_none());
    }
}
