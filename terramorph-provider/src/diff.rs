//! Structural diff between a resource's current observed state and the
//! desired config, as computed by a provider's [`crate::ResourceOps::diff`].

use std::collections::BTreeMap;
use terramorph_core::Value;

/// The before/after of a single changed attribute. Either side may be
/// absent: `old: None` means the attribute didn't exist in the observed
/// state (creation); `new: None` means the provider wants to clear it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDiff {
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// A non-nil diff means there is work to do. `nil` (absence of a `Diff`)
/// means no work, represented here as `Option<Diff>` at the call boundary
/// rather than an always-present-but-possibly-empty struct, so `Diff`
/// itself is never constructed empty by a well-behaved provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub attributes: BTreeMap<String, AttributeDiff>,
}

impl Diff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Removes every attribute whose key has, as a prefix, any entry in
    /// `ignored_prefixes`. Prefix match is intentional: it also drops
    /// nested attribute paths like `acl.#` when `acl` is ignored.
    pub fn filter_ignored(&mut self, ignored_prefixes: &[String]) {
        self.attributes
            .retain(|key, _| !ignored_prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff_with_keys(keys: &[&str]) -> Diff {
        let mut d = Diff::new();
        for k in keys {
            d.attributes.insert(
                k.to_string(),
                AttributeDiff {
                    old: None,
                    new: Some(Value::from("x")),
                },
            );
        }
        d
    }

    #[test]
    fn filter_is_prefix_closed() {
        let mut d = diff_with_keys(&["acl", "acl.#", "acl.0.id", "force_destroy", "bucket_name"]);
        d.filter_ignored(&["acl".to_string(), "force_destroy".to_string()]);
        let mut remaining: Vec<_> = d.attributes.keys().cloned().collect();
        remaining.sort();
        assert_eq!(remaining, vec!["bucket_name".to_string()]);
    }

    #[test]
    fn filter_leaves_unrelated_attributes() {
        let mut d = diff_with_keys(&["region"]);
        d.filter_ignored(&["acl".to_string()]);
        assert!(!d.is_empty());
    }
}
