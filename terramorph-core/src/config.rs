//! Engine-wide settings the spec leaves implementation-defined: walker
//! parallelism and the re-diff-after-apply convergence check.

/// Env var overriding [`EngineConfig::max_in_flight`].
pub const MAX_IN_FLIGHT_ENV: &str = "TERRAMORPH_MAX_IN_FLIGHT";
/// Env var overriding [`EngineConfig::strict_convergence`].
pub const STRICT_CONVERGENCE_ENV: &str = "TERRAMORPH_STRICT_CONVERGENCE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of handler callbacks the walker may run concurrently.
    /// `None` means bounded only by predecessor completion (every eligible
    /// vertex runs at once).
    pub max_in_flight: Option<usize>,
    /// Whether a non-empty diff surviving the ignore-filter after apply is
    /// treated as `Divergent` (the spec's chosen, stronger contract) or
    /// silently accepted. Defaults to `true`; see spec §9.
    pub strict_convergence: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: None,
            strict_convergence: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var(MAX_IN_FLIGHT_ENV) {
            if let Ok(n) = v.parse::<usize>() {
                cfg.max_in_flight = Some(n);
            }
        }
        if let Ok(v) = std::env::var(STRICT_CONVERGENCE_ENV) {
            cfg.strict_convergence = matches!(v.as_str(), "1" | "true" | "TRUE" | "True");
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_and_strict() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_in_flight, None);
        assert!(cfg.strict_convergence);
    }
}
