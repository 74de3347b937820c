//! Error types for insertion and structural verification.

use thiserror::Error;

use crate::{DocId, NodeId, Symbol};

/// Errors reported by [`GeneralizedSuffixTree`](crate::GeneralizedSuffixTree).
///
/// Everything except [`TreeError::Invariant`] is a rejected input: the tree is
/// left untouched when one of those is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The text contains a symbol from the band reserved for string terminators.
    #[error("symbol {symbol:#x} at position {position} is reserved for terminators")]
    ReservedSymbol { position: usize, symbol: Symbol },

    /// Document ids must never decrease across insertions.
    #[error("document id {doc} is lower than the last inserted id {last}")]
    DocIdOutOfOrder { doc: DocId, last: DocId },

    /// Raised under [`IdPolicy::Strict`](crate::IdPolicy::Strict) when an id repeats.
    #[error("document id {0} was already inserted")]
    DuplicateDocId(DocId),

    /// Offsets into a text are stored as `u32`.
    #[error("text of {0} symbols does not fit 32-bit offsets")]
    TextTooLong(usize),

    /// Every text gets its own terminator, and there are `u32::MAX` of them.
    #[error("no terminator symbols left for another text")]
    TooManyTexts,

    /// Node and edge handles are `u32`; the text could overflow them.
    #[error("tree has no room for {0} more nodes")]
    ArenaFull(usize),

    /// The tree failed a structural check. The tree should be discarded.
    #[error("structural invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl TreeError {
    /// True for errors caused by the caller's input rather than a broken tree.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, TreeError::Invariant(_))
    }
}

/// A broken structural invariant found by
/// [`check_invariants`](crate::GeneralizedSuffixTree::check_invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node {node} has two edges starting with symbol {symbol:#x}")]
    DuplicateEdge { node: NodeId, symbol: Symbol },

    #[error("edge filed under {key:#x} at node {node} starts with {first:#x}")]
    MisfiledEdge { node: NodeId, key: Symbol, first: Symbol },

    #[error("edge links of node {0} do not point back at it")]
    BrokenEdgeLinks(NodeId),

    #[error("root node carries a source edge or suffix link")]
    RootLinked,

    #[error("suffix link chain from node {0} does not reach the root")]
    SuffixChainOpen(NodeId),

    #[error("document ids of node {0} are not strictly ascending")]
    UnsortedData(NodeId),

    #[error("node {node} records depth {recorded} but its path has {actual} symbols")]
    DepthMismatch { node: NodeId, recorded: u32, actual: u32 },

    #[error("document {doc} of node {node} is missing from node {missing_in}")]
    MembershipNotClosed { node: NodeId, doc: DocId, missing_in: NodeId },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TreeError>;
