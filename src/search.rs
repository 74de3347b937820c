//! Read-only queries: substring search, counting and common substrings.

use std::collections::{BTreeSet, VecDeque};

use crate::{is_reserved, DocId, GeneralizedSuffixTree, NodeId, Symbol, ROOT};

/// Where a pattern walk stopped: on `node`, or `remaining` symbols above it
/// inside the edge that leads into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Locus {
    node: NodeId,
    remaining: u32,
}

fn to_symbols(pattern: &str) -> Vec<Symbol> {
    pattern.chars().map(Symbol::from).collect()
}

impl GeneralizedSuffixTree {
    /// Walks `pattern` down from the root.
    fn locate(&self, pattern: &[Symbol]) -> Option<Locus> {
        if pattern.iter().any(|&s| is_reserved(s)) {
            return None;
        }
        let mut locus = Locus { node: ROOT, remaining: 0 };
        let mut matched = 0;
        while matched < pattern.len() {
            let edge = self.nodes[locus.node as usize].edges.get(pattern[matched])?;
            let label = self.edge_text(edge);
            let take = label.len().min(pattern.len() - matched);
            if label[..take] != pattern[matched..matched + take] {
                return None;
            }
            matched += take;
            locus = Locus {
                node: self.edges[edge as usize].dest,
                remaining: (label.len() - take) as u32,
            };
        }
        Some(locus)
    }

    /// Documents containing `pattern`, ascending. The empty pattern matches
    /// every document.
    pub fn search(&self, pattern: &str) -> Vec<DocId> {
        self.search_symbols(&to_symbols(pattern))
    }

    pub fn search_symbols(&self, pattern: &[Symbol]) -> Vec<DocId> {
        match self.locate(pattern) {
            Some(locus) => self.nodes[locus.node as usize].index_set().to_vec(),
            None => Vec::new(),
        }
    }

    /// Number of documents containing `pattern`, without collecting them.
    pub fn search_count(&self, pattern: &str) -> usize {
        self.search_count_symbols(&to_symbols(pattern))
    }

    pub fn search_count_symbols(&self, pattern: &[Symbol]) -> usize {
        self.locate(pattern)
            .map_or(0, |locus| self.nodes[locus.node as usize].data.len())
    }

    /// Checks whether `s` is a substring of any inserted text.
    #[must_use]
    pub fn is_substr(&self, s: &[Symbol]) -> bool {
        self.locate(s).is_some()
    }

    /// Checks whether `s` is a suffix of any inserted text.
    #[must_use]
    pub fn is_suffix(&self, s: &[Symbol]) -> bool {
        let Some(locus) = self.locate(s) else {
            return false;
        };
        let node = &self.nodes[locus.node as usize];
        if locus.remaining > 0 {
            // The next symbol on the edge must be a terminator.
            let edge = node.source_edge.map_or(&[][..], |edge| self.edge_text(edge));
            return edge
                .get(edge.len() - locus.remaining as usize)
                .is_some_and(|&s| is_reserved(s));
        }
        node.edges.iter().any(|(first, _)| is_reserved(first))
    }

    /// Union of the document sets of `node` and everything below it,
    /// collected breadth first over tree edges.
    ///
    /// It always equals the node's own set; this is the slow path that
    /// proves it.
    pub fn fetch_index_set(&self, node: NodeId) -> BTreeSet<DocId> {
        let mut results = BTreeSet::new();
        let mut queue = VecDeque::from([node]);
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id as usize];
            queue.extend(node.edges.values().map(|edge| self.edges[edge as usize].dest));
            results.extend(node.data.iter());
        }
        results
    }

    /// Size of [`fetch_index_set`](Self::fetch_index_set).
    pub fn compute_count(&self, node: NodeId) -> usize {
        self.fetch_index_set(node).len()
    }

    /// Longest substring shared by every inserted document.
    ///
    /// A node's path is common to all documents exactly when its document set
    /// is full, so this is the deepest such node. Leaf paths end in a
    /// terminator, which is dropped.
    #[must_use]
    pub fn longest_common_substring_all(&self) -> Vec<Symbol> {
        if self.document_count == 0 {
            return Vec::new();
        }
        let common_len = |id: NodeId| {
            let node = &self.nodes[id as usize];
            if node.is_leaf() {
                node.substring_length - 1
            } else {
                node.substring_length
            }
        };
        let best = self
            .nodes()
            .filter(|&id| self.nodes[id as usize].data.len() == self.document_count)
            .max_by_key(|&id| common_len(id))
            .unwrap_or(ROOT);

        let mut text = self.node_text(best);
        text.truncate(common_len(best) as usize);
        text
    }

    /// Finds the longest common substring between `s` and the inserted
    /// texts without inserting `s`.
    ///
    /// Matching statistics: extend the match as far as possible, then drop
    /// its first symbol by following a suffix link and rescanning the rest
    /// of the match with skip/count.
    #[must_use]
    pub fn longest_common_substring_with<'a>(&self, s: &'a [Symbol]) -> &'a [Symbol] {
        let mut longest = (0, 0);
        let mut node = ROOT;
        // Symbols matched down to `node`, and past it into the next edge.
        let mut depth = 0usize;
        let mut along = 0usize;

        for start in 0..s.len() {
            while start + depth + along < s.len() {
                let next = s[start + depth + along];
                if is_reserved(next) {
                    break;
                }
                let Some(edge) = self.nodes[node as usize].edges.get(s[start + depth]) else {
                    break;
                };
                let label = self.edge_text(edge);
                if label[along] != next {
                    break;
                }
                along += 1;
                if along == label.len() {
                    node = self.edges[edge as usize].dest;
                    depth += along;
                    along = 0;
                }
            }
            if depth + along > longest.1 {
                longest = (start, depth + along);
            }
            if depth + along == 0 {
                continue;
            }

            if node == ROOT {
                along -= 1;
            } else {
                node = self.nodes[node as usize].suffix.unwrap_or(ROOT);
                depth -= 1;
            }
            while along > 0 {
                let Some(edge) = self.nodes[node as usize].edges.get(s[start + 1 + depth]) else {
                    break;
                };
                let len = self.edge_len(edge) as usize;
                if along < len {
                    break;
                }
                node = self.edges[edge as usize].dest;
                depth += len;
                along -= len;
            }
        }
        &s[longest.0..longest.0 + longest.1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(s: &str) -> Vec<Symbol> {
        to_symbols(s)
    }

    #[test]
    fn locate_reports_position_inside_edge() {
        let mut tree = GeneralizedSuffixTree::new();
        tree.insert("banana", 0).unwrap();

        let locus = tree.locate(&symbols("ban")).unwrap();
        assert!(locus.remaining > 0);
        assert!(tree.node(locus.node).is_leaf());

        let locus = tree.locate(&symbols("ana")).unwrap();
        assert_eq!(locus.remaining, 0);
        assert_eq!(tree.node_string(locus.node), "ana");

        assert_eq!(tree.locate(&symbols("bx")), None);
        assert_eq!(tree.locate(&[Symbol::MAX]), None);
    }

    #[test]
    fn suffix_checks_look_for_terminators() {
        let mut tree = GeneralizedSuffixTree::new();
        tree.insert("banana", 0).unwrap();
        assert!(tree.is_suffix(&symbols("na")));
        assert!(tree.is_suffix(&symbols("banana")));
        assert!(tree.is_suffix(&[]));
        assert!(!tree.is_suffix(&symbols("nan")));
        assert!(tree.is_substr(&symbols("nan")));
    }

    #[test]
    fn subtree_walk_visits_every_document() {
        let mut tree = GeneralizedSuffixTree::new();
        tree.insert("abab", 3).unwrap();
        tree.insert("bba", 5).unwrap();
        let all: Vec<DocId> = tree.fetch_index_set(ROOT).into_iter().collect();
        assert_eq!(all, vec![3, 5]);
        assert_eq!(tree.compute_count(ROOT), 2);
    }
}
