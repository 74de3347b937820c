//! Per-node decorations for downstream duplicate clustering.
//!
//! The tree never reads these. A clustering pass walks the nodes (usually
//! through [`GeneralizedSuffixTree::nodes_by_depth`]) and records its
//! decisions here, keyed by node handle.

use std::collections::HashMap;

use crate::{DocId, GeneralizedSuffixTree, NodeId};

/// What a clustering pass decided about one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMark {
    pub in_a_cluster: bool,
    pub suffix_duplicate: bool,
    pub suffix_ratio_length: Option<u32>,
    pub prefix_duplicate: bool,
    pub prefix_ratio_length: Option<u32>,
    /// Snapshot of the node's documents taken when the mark was made.
    pub index_set: Option<Vec<DocId>>,
}

impl ClusterMark {
    pub fn index_size(&self) -> usize {
        self.index_set.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterAnnotations {
    marks: HashMap<NodeId, ClusterMark>,
}

impl ClusterAnnotations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: NodeId) -> Option<&ClusterMark> {
        self.marks.get(&node)
    }

    /// Mark for `node`, created empty on first access.
    pub fn mark(&mut self, node: NodeId) -> &mut ClusterMark {
        self.marks.entry(node).or_default()
    }

    pub fn remove(&mut self, node: NodeId) -> Option<ClusterMark> {
        self.marks.remove(&node)
    }

    pub fn in_a_cluster(&self, node: NodeId) -> bool {
        self.marks.get(&node).is_some_and(|mark| mark.in_a_cluster)
    }

    /// Copies the node's current document set into its mark.
    pub fn snapshot_index_set(
        &mut self,
        tree: &GeneralizedSuffixTree,
        node: NodeId,
    ) -> &ClusterMark {
        let mark = self.mark(node);
        mark.index_set = Some(tree.node(node).index_set().to_vec());
        mark
    }

    /// Nodes currently flagged as cluster members, in ascending handle order.
    pub fn clustered_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .marks
            .iter()
            .filter(|(_, mark)| mark.in_a_cluster)
            .map(|(&node, _)| node)
            .collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }
}
