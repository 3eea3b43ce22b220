//! Aggregated error/warning records returned by the walker and by reconcile.

use std::fmt;

/// The well-known error kinds of the reconciliation protocol.
///
/// Warnings never carry a `Kind`, only error-severity diagnostics are
/// tagged, since callers branch on kind to decide retry/skip behavior, and
/// warnings are informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    ProviderConfigFailed,
    UnknownResourceType,
    UnresolvedReference,
    CyclicManifest,
    RefreshFailed,
    DiffFailed,
    ApplyFailed,
    StateReadFailed,
    StateWriteFailed,
    Divergent,
    Cancelled,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::ProviderConfigFailed => "ProviderConfigFailed",
            Kind::UnknownResourceType => "UnknownResourceType",
            Kind::UnresolvedReference => "UnresolvedReference",
            Kind::CyclicManifest => "CyclicManifest",
            Kind::RefreshFailed => "RefreshFailed",
            Kind::DiffFailed => "DiffFailed",
            Kind::ApplyFailed => "ApplyFailed",
            Kind::StateReadFailed => "StateReadFailed",
            Kind::StateWriteFailed => "StateWriteFailed",
            Kind::Divergent => "Divergent",
            Kind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single diagnostic entry: `(severity, summary, detail)`, plus an
/// optional error [`Kind`] tag for the error-severity ones raised by the
/// engine itself (as opposed to ad hoc provider warnings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: Option<Kind>,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(kind: Kind, summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: Some(kind),
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind: None,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}: {}", self.summary, self.detail),
            Severity::Warning => write!(f, "warning: {}: {}", self.summary, self.detail),
        }
    }
}

/// Ordered, accumulable list of diagnostics. Never persisted; produced fresh
/// by every reconcile/walk and surfaced to the caller of `Manifest::apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_error_true_iff_any_error_severity() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_error());
        diags.push(Diagnostic::warning("just fyi", "no action needed"));
        assert!(!diags.has_error());
        diags.push(Diagnostic::error(Kind::Divergent, "did not converge", "x"));
        assert!(diags.has_error());
    }

    #[test]
    fn extend_preserves_order() {
        let mut a = Diagnostics::new();
        a.push(Diagnostic::warning("first", ""));
        let mut b = Diagnostics::new();
        b.push(Diagnostic::warning("second", ""));
        a.extend(b);
        let summaries: Vec<_> = a.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["first", "second"]);
    }
}
