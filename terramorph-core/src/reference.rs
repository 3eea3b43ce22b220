//! Parses the symbolic reference grammar `<name>.<section>.<field>` used
//! inside handler config maps, both to wire DAG edges at manifest build
//! time and to substitute live values at reconcile entry time.

use crate::value::Config;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ResourceConfig,
    ResourceState,
}

impl Section {
    fn parse(s: &str) -> Option<Section> {
        match s {
            "ResourceConfig" => Some(Section::ResourceConfig),
            "ResourceState" => Some(Section::ResourceState),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::ResourceConfig => f.write_str("ResourceConfig"),
            Section::ResourceState => f.write_str("ResourceState"),
        }
    }
}

/// A parsed `<name>.<section>.<field>` reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub section: Section,
    pub field: String,
}

impl Reference {
    /// Parses `s` against the reference grammar. Returns `None` if `s`
    /// isn't shaped like a reference at all (not an error, most string
    /// config values are plain literals).
    pub fn parse(s: &str) -> Option<Reference> {
        if s.matches('.').count() != 2 {
            return None;
        }
        let mut parts = s.splitn(3, '.');
        let name = parts.next()?;
        let section = parts.next()?;
        let field = parts.next()?;
        if name.is_empty() || field.is_empty() {
            return None;
        }
        let section = Section::parse(section)?;
        Some(Reference {
            name: name.to_string(),
            section,
            field: field.to_string(),
        })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.name, self.section, self.field)
    }
}

/// Scans the top-level string values of a config map for reference
/// strings, returning the config key alongside the parsed reference.
pub fn scan_references(config: &Config) -> Vec<(String, Reference)> {
    config
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_str()
                .and_then(Reference::parse)
                .map(|r| (key.clone(), r))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn parses_resource_state_reference() {
        let r = Reference::parse("P.ResourceState.ID").unwrap();
        assert_eq!(r.name, "P");
        assert_eq!(r.section, Section::ResourceState);
        assert_eq!(r.field, "ID");
    }

    #[test]
    fn parses_resource_config_reference() {
        let r = Reference::parse("Bucket.ResourceConfig.name").unwrap();
        assert_eq!(r.section, Section::ResourceConfig);
    }

    #[test]
    fn rejects_unknown_section() {
        assert!(Reference::parse("A.Bogus.field").is_none());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(Reference::parse("A.ResourceState").is_none());
        assert!(Reference::parse("A.ResourceState.nested.field").is_none());
    }

    #[test]
    fn plain_literal_is_not_a_reference() {
        assert!(Reference::parse("us-east-1").is_none());
        assert!(Reference::parse("arn:aws:iam::123:role/x").is_none());
    }

    #[test]
    fn scan_references_finds_only_string_values() {
        let mut cfg = Config::new();
        cfg.insert("policy_arn".to_string(), Value::from("P.ResourceState.ID"));
        cfg.insert("region".to_string(), Value::from("us-east-1"));
        cfg.insert("count".to_string(), Value::from(3i64));
        let refs = scan_references(&cfg);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].0, "policy_arn");
        assert_eq!(refs[0].1.name, "P");
    }
}
