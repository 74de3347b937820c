//! Construction options.

/// How document ids handed to `insert` are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Ids may repeat but never decrease. Several texts can then share one
    /// document id, and re-inserting a text under the last id is a no-op for
    /// every query.
    #[default]
    NonDecreasing,
    /// Every insertion needs a strictly greater id than the previous one.
    Strict,
}

/// Options for [`GeneralizedSuffixTree::with_config`](crate::GeneralizedSuffixTree::with_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeConfig {
    pub id_policy: IdPolicy,
    /// Expected total number of symbols to be inserted. Node and edge storage
    /// is reserved up front from it; zero reserves nothing.
    pub capacity_hint: usize,
}

impl TreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    #[must_use]
    pub fn capacity_hint(mut self, symbols: usize) -> Self {
        self.capacity_hint = symbols;
        self
    }
}
