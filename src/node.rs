//! Tree vertices and their compact document-id payload.

use std::cmp::Ordering;
use std::fmt;

use mediumvec::Vec32;

use crate::edge::EdgeBag;
use crate::{DocId, EdgeId, NodeId};

/// Sorted, duplicate free document ids.
///
/// Backed by a `Vec32`, whose length and capacity are 32 bits wide: trees have
/// far more nodes than the average node has documents, so the per-node header
/// matters more than the growth policy.
#[derive(Clone)]
pub struct IndexSet {
    ids: Vec32<DocId>,
}

impl IndexSet {
    pub fn new() -> Self {
        Self { ids: Vec32::new() }
    }

    /// Binary search; correct because the ids are kept sorted.
    pub fn contains(&self, doc: DocId) -> bool {
        self.ids.binary_search(&doc).is_ok()
    }

    /// Adds `doc`, returning false if it was already present.
    ///
    /// Ids arrive in non-decreasing order during construction, so the common
    /// case is a push at the end.
    pub(crate) fn insert(&mut self, doc: DocId) -> bool {
        match self.ids.last() {
            Some(&last) if last == doc => false,
            Some(&last) if last > doc => {
                if self.contains(doc) {
                    return false;
                }
                self.ids.push(doc);
                self.ids.sort_unstable();
                true
            }
            _ => {
                self.ids.push(doc);
                true
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, doc: DocId) {
        self.ids.push(doc);
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, doc: DocId) {
        let mut kept = Vec32::new();
        for id in self.iter().filter(|&id| id != doc) {
            kept.push(id);
        }
        self.ids = kept;
    }

    pub fn as_slice(&self) -> &[DocId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.ids.iter().copied()
    }
}

impl Default for IndexSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for IndexSet {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for IndexSet {}

impl fmt::Debug for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.as_slice()).finish()
    }
}

/// A vertex of the tree.
///
/// `suffix` is the suffix link of Ukkonen's paper: if `s` is the path from the
/// root to this node, `suffix` is the node for `s` without its first symbol.
/// Leaves are linked too, to the leaf of the next shorter suffix of their text.
/// `data` holds every document with a suffix running through this node.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) edges: EdgeBag,
    pub(crate) suffix: Option<NodeId>,
    pub(crate) source_edge: Option<EdgeId>,
    pub(crate) substring_length: u32,
    pub(crate) data: IndexSet,
}

impl Node {
    pub(crate) fn new(source_edge: Option<EdgeId>, substring_length: u32) -> Self {
        Self {
            edges: EdgeBag::default(),
            suffix: None,
            source_edge,
            substring_length,
            data: IndexSet::new(),
        }
    }

    pub fn edges(&self) -> &EdgeBag {
        &self.edges
    }

    pub fn suffix(&self) -> Option<NodeId> {
        self.suffix
    }

    /// Edge this node is reached through; `None` only for the root.
    pub fn source_edge(&self) -> Option<EdgeId> {
        self.source_edge
    }

    /// Number of symbols on the path from the root to this node.
    pub fn substring_length(&self) -> u32 {
        self.substring_length
    }

    /// Documents containing this node's path, ascending.
    pub fn index_set(&self) -> &[DocId] {
        self.data.as_slice()
    }

    pub fn contains(&self, doc: DocId) -> bool {
        self.data.contains(doc)
    }

    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    /// Orders shallow nodes first. Equal depths compare equal; use a stable
    /// sort if their relative order matters.
    pub fn cmp_depth(&self, other: &Node) -> Ordering {
        self.substring_length.cmp(&other.substring_length)
    }
}
