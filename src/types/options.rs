/// How an arithmetic resolver treats operator-sourced operands after its
/// first successful evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResolverCaching {
    /// Resolve operator operands once, then keep computing from the cached
    /// values until the resolver is reset.
    #[default]
    Sticky,
    /// Re-read operator operands on every evaluation.
    Recompute,
}

/// What `reset()` does to the state held by matching nodes.
///
/// A resolver's mode collapse is permanent unless the tree opts into
/// [`ResetPolicy::ReleaseCaches`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResetPolicy {
    /// Clear matching events. Collapsed resolvers keep their cached operands.
    #[default]
    Clear,
    /// Clear matching events and drop resolver caches, so collapsed
    /// resolvers read their operator operands again.
    ReleaseCaches,
    /// Only propagate the reset; matching events and caches survive.
    RetainMatches,
}

/// Evaluation options for an [`OperatorTree`](super::OperatorTree).
///
/// # Example
///
/// ```
/// use event_algebra::{OperatorTree, ResetPolicy, ResolverCaching, TreeOptions};
///
/// let tree = OperatorTree::with_options(
///     TreeOptions::new()
///         .with_resolver_caching(ResolverCaching::Recompute)
///         .with_reset_policy(ResetPolicy::RetainMatches),
/// );
/// assert_eq!(tree.options().resolver_caching(), ResolverCaching::Recompute);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOptions {
    resolver_caching: ResolverCaching,
    reset: ResetPolicy,
}

impl TreeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_resolver_caching(mut self, caching: ResolverCaching) -> Self {
        self.resolver_caching = caching;
        self
    }

    #[must_use]
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset = policy;
        self
    }

    #[must_use]
    pub fn resolver_caching(&self) -> ResolverCaching {
        self.resolver_caching
    }

    #[must_use]
    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset
    }

    /// Whether a reset should discard matching events.
    #[must_use]
    pub fn clears_on_reset(&self) -> bool {
        matches!(self.reset, ResetPolicy::Clear | ResetPolicy::ReleaseCaches)
    }

    /// Whether a reset should also drop resolver caches.
    #[must_use]
    pub fn releases_caches_on_reset(&self) -> bool {
        self.reset == ResetPolicy::ReleaseCaches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_sticky_clearing_behavior() {
        let options = TreeOptions::default();
        assert_eq!(options.resolver_caching(), ResolverCaching::Sticky);
        assert_eq!(options.reset_policy(), ResetPolicy::Clear);
        assert!(options.clears_on_reset());
        assert!(!options.releases_caches_on_reset());
    }

    #[test]
    fn release_caches_also_clears_matches() {
        let options = TreeOptions::new().with_reset_policy(ResetPolicy::ReleaseCaches);
        assert!(options.clears_on_reset());
        assert!(options.releases_caches_on_reset());
    }

    #[test]
    fn builder_overrides() {
        let options = TreeOptions::new()
            .with_resolver_caching(ResolverCaching::Recompute)
            .with_reset_policy(ResetPolicy::RetainMatches);
        assert_eq!(options.resolver_caching(), ResolverCaching::Recompute);
        assert!(!options.clears_on_reset());
        assert!(!options.releases_caches_on_reset());
    }
}
