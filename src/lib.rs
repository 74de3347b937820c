//! A generalized suffix tree over a collection of documents, built with
//! Ukkonen's algorithm.
//!
//! Every node keeps the sorted set of documents whose texts contain the
//! node's path, so "which documents contain this substring" is answered by
//! walking the pattern and reading one node.
//!
//! # Examples
//!
//! ```
//! use generalized_suffix_index::GeneralizedSuffixTree;
//!
//! let mut tree = GeneralizedSuffixTree::new();
//! tree.insert("cacao", 0).unwrap();
//! tree.insert("banana", 1).unwrap();
//! assert_eq!(tree.search("ana"), vec![1]);
//! assert_eq!(tree.search("a"), vec![0, 1]);
//! assert_eq!(tree.search_count("ca"), 1);
//! assert!(tree.search("xyz").is_empty());
//! ```
mod annotation;
mod config;
mod edge;
mod error;
mod node;
mod search;

use log::{debug, trace};
use smallvec::{smallvec, SmallVec};

pub use annotation::{ClusterAnnotations, ClusterMark};
pub use config::{IdPolicy, TreeConfig};
pub use edge::{Edge, EdgeBag, Label};
pub use error::{InvariantViolation, Result, TreeError};
pub use node::{IndexSet, Node};

/// One symbol of a text. Characters map to their scalar value; other
/// alphabets can be fed through [`GeneralizedSuffixTree::insert_symbols`].
pub type Symbol = u64;
pub type DocId = u32;
pub type NodeId = u32;
pub type EdgeId = u32;
pub type TextId = u32;

pub const ROOT: NodeId = 0;

/// Symbols at or above this value are reserved: each inserted text is closed
/// by its own terminator, `Symbol::MAX - text_id`.
pub const RESERVED_SYMBOLS_START: Symbol = Symbol::MAX - u32::MAX as Symbol;

/// True for symbols that may not appear in inserted texts.
pub fn is_reserved(symbol: Symbol) -> bool {
    symbol >= RESERVED_SYMBOLS_START
}

fn terminator(text: TextId) -> Symbol {
    Symbol::MAX - Symbol::from(text)
}

/// The active point of Ukkonen's algorithm: the node we stand on, the position
/// in the current text of the first symbol of the edge we follow from it, and
/// how many symbols of that edge are already matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePoint {
    node: NodeId,
    edge: u32,
    length: u32,
}

/// State carried from one symbol of a text to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Phase {
    active: ActivePoint,
    /// Suffixes of the processed prefix still waiting for a leaf.
    remainder: u32,
    text: TextId,
    doc: DocId,
    /// Leaf of the previous suffix, waiting for its suffix link.
    last_leaf: Option<NodeId>,
}

impl Phase {
    const fn new(text: TextId, doc: DocId) -> Self {
        Self {
            active: ActivePoint { node: ROOT, edge: 0, length: 0 },
            remainder: 0,
            text,
            doc,
            last_leaf: None,
        }
    }
}

/// The generalized suffix tree.
///
/// Nodes and edges live in two arenas and refer to each other by index: an
/// edge is owned by the bag of its source node, suffix links are plain
/// handles. Texts are stored once, terminator included, and labels point into
/// them.
///
/// Insertion needs `&mut self`; queries only borrow the tree.
#[derive(Debug)]
pub struct GeneralizedSuffixTree {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    texts: Vec<Vec<Symbol>>,
    text_docs: Vec<DocId>,
    last_doc: Option<DocId>,
    document_count: usize,
    config: TreeConfig,
}

impl Default for GeneralizedSuffixTree {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl GeneralizedSuffixTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        // A text of n symbols adds at most n + 1 leaves and n internal nodes.
        let reserve = config.capacity_hint.saturating_mul(2);
        let mut nodes = Vec::with_capacity(reserve.max(1));
        nodes.push(Node::new(None, 0));
        Self {
            nodes,
            edges: Vec::with_capacity(reserve),
            texts: Vec::new(),
            text_docs: Vec::new(),
            last_doc: None,
            document_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Inserts `text` as part of document `doc`.
    ///
    /// Ids must not decrease from one call to the next (see [`IdPolicy`]).
    pub fn insert(&mut self, text: &str, doc: DocId) -> Result<()> {
        let symbols: Vec<Symbol> = text.chars().map(Symbol::from).collect();
        self.insert_symbols(&symbols, doc)
    }

    /// Inserts a text over an arbitrary alphabet. Symbols at or above
    /// [`RESERVED_SYMBOLS_START`] are rejected.
    pub fn insert_symbols(&mut self, symbols: &[Symbol], doc: DocId) -> Result<()> {
        self.validate(symbols, doc)?;

        let text = self.texts.len() as TextId;
        let mut stored = Vec::with_capacity(symbols.len() + 1);
        stored.extend_from_slice(symbols);
        stored.push(terminator(text));
        self.texts.push(stored);
        self.text_docs.push(doc);
        if self.last_doc != Some(doc) {
            self.document_count += 1;
        }
        self.last_doc = Some(doc);

        let nodes_before = self.nodes.len();
        let mut phase = Phase::new(text, doc);
        for pos in 0..=symbols.len() as u32 {
            phase = self.extend(phase, pos);
        }
        debug_assert_eq!(phase.remainder, 0, "terminator left suffixes without leaves");
        if let Some(leaf) = phase.last_leaf {
            self.nodes[leaf as usize].suffix = Some(ROOT);
        }

        debug!(
            "inserted text {} ({} symbols) for document {}: {} new nodes, {} total",
            text,
            symbols.len(),
            doc,
            self.nodes.len() - nodes_before,
            self.nodes.len()
        );
        Ok(())
    }

    fn validate(&self, symbols: &[Symbol], doc: DocId) -> Result<()> {
        if let Some(position) = symbols.iter().position(|&s| is_reserved(s)) {
            return Err(TreeError::ReservedSymbol { position, symbol: symbols[position] });
        }
        if symbols.len() >= u32::MAX as usize {
            return Err(TreeError::TextTooLong(symbols.len()));
        }
        if self.texts.len() >= u32::MAX as usize {
            return Err(TreeError::TooManyTexts);
        }
        // A text of n symbols plus its terminator adds at most 2n + 1 nodes
        // and as many edges.
        let growth = symbols.len().saturating_add(1).saturating_mul(2);
        if !has_room(self.nodes.len(), growth) || !has_room(self.edges.len(), growth) {
            return Err(TreeError::ArenaFull(growth));
        }
        match self.last_doc {
            Some(last) if doc < last => Err(TreeError::DocIdOutOfOrder { doc, last }),
            Some(last) if doc == last && self.config.id_policy == IdPolicy::Strict => {
                Err(TreeError::DuplicateDocId(doc))
            }
            _ => Ok(()),
        }
    }

    /// Runs one phase of Ukkonen's algorithm: makes every suffix of
    /// `text[..=pos]` present in the tree.
    fn extend(&mut self, mut phase: Phase, pos: u32) -> Phase {
        let text = phase.text;
        let ch = self.symbol(text, pos);
        let mut needs_link: Option<NodeId> = None;
        phase.remainder += 1;

        while phase.remainder > 0 {
            if phase.active.length == 0 {
                phase.active.edge = pos;
            }
            let first = self.symbol(text, phase.active.edge);
            match self.nodes[phase.active.node as usize].edges.get(first) {
                None => {
                    let leaf = self.add_leaf(phase.active.node, text, pos, phase.doc);
                    self.chain_leaf(&mut phase, leaf);
                    if let Some(node) = needs_link.take() {
                        self.nodes[node as usize].suffix = Some(phase.active.node);
                    }
                }
                Some(edge) => {
                    if self.canonize(&mut phase.active, edge) {
                        continue;
                    }
                    let label = self.edges[edge as usize].label;
                    if self.symbol(label.text, label.start + phase.active.length) == ch {
                        // Every shorter suffix is already present too.
                        if let Some(node) = needs_link.take() {
                            self.nodes[node as usize].suffix = Some(phase.active.node);
                        }
                        phase.active.length += 1;
                        break;
                    }
                    let split = self.split_edge(edge, phase.active.length);
                    let leaf = self.add_leaf(split, text, pos, phase.doc);
                    self.chain_leaf(&mut phase, leaf);
                    if let Some(node) = needs_link.replace(split) {
                        self.nodes[node as usize].suffix = Some(split);
                    }
                }
            }

            phase.remainder -= 1;
            if phase.active.node == ROOT && phase.active.length > 0 {
                phase.active.length -= 1;
                phase.active.edge = pos + 1 - phase.remainder;
            } else if phase.active.node != ROOT {
                phase.active.node = self.nodes[phase.active.node as usize].suffix.unwrap_or(ROOT);
            }
        }
        phase
    }

    /// Skip/count step: hops over `edge` when the active length covers it.
    /// Returns true if the active point moved.
    fn canonize(&self, active: &mut ActivePoint, edge: EdgeId) -> bool {
        let len = self.edge_len(edge);
        if active.length < len {
            return false;
        }
        active.edge += len;
        active.length -= len;
        active.node = self.edges[edge as usize].dest;
        true
    }

    fn chain_leaf(&mut self, phase: &mut Phase, leaf: NodeId) {
        if let Some(prev) = phase.last_leaf.replace(leaf) {
            self.nodes[prev as usize].suffix = Some(leaf);
        }
    }

    /// Hangs a leaf for `text[pos..]` below `parent`.
    fn add_leaf(&mut self, parent: NodeId, text: TextId, pos: u32, doc: DocId) -> NodeId {
        let leaf = self.nodes.len() as NodeId;
        let depth = self.nodes[parent as usize].substring_length + self.text_len(text) - pos;
        let edge = self.push_edge(Label::open(text, pos), parent, leaf);
        self.nodes.push(Node::new(Some(edge), depth));
        self.attach(parent, self.symbol(text, pos), edge);
        trace!("leaf {} below node {} for text {} at {}", leaf, parent, text, pos);
        self.add_ref(leaf, doc);
        leaf
    }

    /// Splits `edge` after `at` symbols and returns the new middle node.
    ///
    /// The middle node starts out with its child's documents, which are
    /// exactly the documents below it, and a provisional suffix link to the
    /// root that the next extension overwrites.
    fn split_edge(&mut self, edge: EdgeId, at: u32) -> NodeId {
        let Edge { label, source, dest } = self.edges[edge as usize];
        let middle = self.nodes.len() as NodeId;
        let depth = self.nodes[source as usize].substring_length + at;
        let lower_start = label.start + at;

        let mut node = Node::new(Some(edge), depth);
        node.suffix = Some(ROOT);
        node.data = self.nodes[dest as usize].data.clone();
        self.nodes.push(node);

        let lower = self.push_edge(Label { start: lower_start, ..label }, middle, dest);
        self.attach(middle, self.symbol(label.text, lower_start), lower);
        self.nodes[dest as usize].source_edge = Some(lower);

        let upper = &mut self.edges[edge as usize];
        upper.label.end = Some(lower_start);
        upper.dest = middle;

        trace!("split edge {} of node {} at {}: new node {}", edge, source, at, middle);
        middle
    }

    /// Records that document `doc` has a suffix through `node`.
    ///
    /// Membership is closed under parents and suffix links, so the walk
    /// follows both and stops wherever `doc` is already present.
    fn add_ref(&mut self, node: NodeId, doc: DocId) {
        let mut pending: SmallVec<[NodeId; 4]> = smallvec![node];
        while let Some(id) = pending.pop() {
            let node = &mut self.nodes[id as usize];
            if !node.data.insert(doc) {
                continue;
            }
            if let Some(link) = node.suffix {
                pending.push(link);
            }
            if let Some(edge) = node.source_edge {
                pending.push(self.edges[edge as usize].source);
            }
        }
    }

    fn push_edge(&mut self, label: Label, source: NodeId, dest: NodeId) -> EdgeId {
        self.edges.push(Edge { label, source, dest });
        (self.edges.len() - 1) as EdgeId
    }

    fn attach(&mut self, node: NodeId, first: Symbol, edge: EdgeId) {
        let displaced = self.nodes[node as usize].edges.put(first, edge);
        debug_assert!(
            displaced.is_none(),
            "node {} already has an edge starting with {:#x}",
            node,
            first
        );
    }

    fn symbol(&self, text: TextId, pos: u32) -> Symbol {
        self.texts[text as usize][pos as usize]
    }

    fn text_len(&self, text: TextId) -> u32 {
        self.texts[text as usize].len() as u32
    }

    fn label_symbols(&self, label: &Label) -> &[Symbol] {
        let text = &self.texts[label.text as usize];
        &text[label.start as usize..label.end(text.len() as u32) as usize]
    }

    fn edge_len(&self, edge: EdgeId) -> u32 {
        let label = &self.edges[edge as usize].label;
        label.end(self.text_len(label.text)) - label.start
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// # Panics
    ///
    /// Panics if `id` is not a node of this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id as usize]
    }

    /// All node handles, root first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len() as NodeId
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct document ids inserted so far.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    /// Symbols of an inserted text, terminator excluded.
    pub fn text(&self, text: TextId) -> Option<&[Symbol]> {
        self.texts.get(text as usize).map(|t| &t[..t.len() - 1])
    }

    /// Document a text was inserted under.
    pub fn text_document(&self, text: TextId) -> Option<DocId> {
        self.text_docs.get(text as usize).copied()
    }

    /// Symbols of `edge`'s label.
    pub fn edge_text(&self, edge: EdgeId) -> &[Symbol] {
        self.label_symbols(&self.edges[edge as usize].label)
    }

    /// Parent of `node`; `None` for the root.
    pub fn source_node(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node as usize]
            .source_edge
            .map(|edge| self.edges[edge as usize].source)
    }

    /// Path from the root to `node`, rebuilt through source edges.
    pub fn node_text(&self, node: NodeId) -> Vec<Symbol> {
        let mut text = Vec::with_capacity(self.nodes[node as usize].substring_length as usize);
        let mut cur = node;
        while let Some(edge) = self.nodes[cur as usize].source_edge {
            let edge = &self.edges[edge as usize];
            text.extend(self.label_symbols(&edge.label).iter().rev());
            cur = edge.source;
        }
        text.reverse();
        text
    }

    /// Like [`node_text`](Self::node_text) for character texts. Terminators
    /// and symbols that are not characters are dropped.
    pub fn node_string(&self, node: NodeId) -> String {
        symbols_to_string(&self.node_text(node))
    }

    /// Node handles ordered from shallow to deep. The sort is stable, so
    /// nodes of equal depth stay in creation order.
    pub fn nodes_by_depth(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes().collect();
        ids.sort_by(|a, b| self.nodes[*a as usize].cmp_depth(&self.nodes[*b as usize]));
        ids
    }

    /// Verifies the structural invariants of the whole tree.
    pub fn check_invariants(&self) -> Result<()> {
        let root = &self.nodes[ROOT as usize];
        if root.suffix.is_some() || root.source_edge.is_some() {
            return Err(InvariantViolation::RootLinked.into());
        }
        for id in self.nodes() {
            let node = &self.nodes[id as usize];
            if node.data.as_slice().windows(2).any(|w| w[0] >= w[1]) {
                return Err(InvariantViolation::UnsortedData(id).into());
            }
            self.check_edges(id, node)?;
            self.check_membership(id, node)?;
            if id != ROOT {
                self.check_suffix_chain(id)?;
            }
        }
        Ok(())
    }

    fn check_edges(&self, id: NodeId, node: &Node) -> Result<()> {
        let mut firsts = Vec::with_capacity(node.edges.len());
        for (key, edge_id) in node.edges.iter() {
            let edge = &self.edges[edge_id as usize];
            let first = self.label_symbols(&edge.label)[0];
            if first != key {
                return Err(InvariantViolation::MisfiledEdge { node: id, key, first }.into());
            }
            if edge.source != id || self.nodes[edge.dest as usize].source_edge != Some(edge_id) {
                return Err(InvariantViolation::BrokenEdgeLinks(id).into());
            }
            let child = &self.nodes[edge.dest as usize];
            let expected = node.substring_length + self.edge_len(edge_id);
            if child.substring_length != expected {
                return Err(InvariantViolation::DepthMismatch {
                    node: edge.dest,
                    recorded: child.substring_length,
                    actual: expected,
                }
                .into());
            }
            firsts.push(first);
        }
        firsts.sort_unstable();
        if let Some(w) = firsts.windows(2).find(|w| w[0] == w[1]) {
            return Err(InvariantViolation::DuplicateEdge { node: id, symbol: w[0] }.into());
        }
        Ok(())
    }

    fn check_membership(&self, id: NodeId, node: &Node) -> Result<()> {
        let neighbours = node.suffix.into_iter().chain(self.source_node(id));
        for other in neighbours {
            let target = &self.nodes[other as usize];
            if let Some(doc) = node.data.iter().find(|&doc| !target.contains(doc)) {
                return Err(InvariantViolation::MembershipNotClosed {
                    node: id,
                    doc,
                    missing_in: other,
                }
                .into());
            }
        }
        Ok(())
    }

    /// A suffix link drops exactly one leading symbol, so link targets are
    /// one level shallower and every chain ends at the root (depth zero).
    fn check_suffix_chain(&self, id: NodeId) -> Result<()> {
        let node = &self.nodes[id as usize];
        let link_depth = node.suffix.map(|link| self.nodes[link as usize].substring_length);
        if link_depth.map(|d| d + 1) == Some(node.substring_length) {
            Ok(())
        } else {
            Err(InvariantViolation::SuffixChainOpen(id).into())
        }
    }

    /// Dumps the tree to stdout, one edge per line, indented by depth.
    pub fn pretty_print(&self) {
        self.print_recursive(ROOT, 0);
    }

    fn print_recursive(&self, node: NodeId, space_count: usize) {
        for edge in self.nodes[node as usize].edges.values() {
            let dest = self.edges[edge as usize].dest;
            println!(
                "{:indent$}{} {:?}",
                "",
                render_label(self.edge_text(edge)),
                self.nodes[dest as usize].data,
                indent = space_count
            );
            self.print_recursive(dest, space_count + 4);
        }
    }
}

/// True if an arena holding `used` entries can take `extra` more without
/// overflowing 32-bit handles.
fn has_room(used: usize, extra: usize) -> bool {
    used.saturating_add(extra) <= NodeId::MAX as usize
}

fn symbol_to_char(symbol: Symbol) -> Option<char> {
    u32::try_from(symbol).ok().and_then(char::from_u32)
}

pub(crate) fn symbols_to_string(symbols: &[Symbol]) -> String {
    symbols.iter().filter_map(|&s| symbol_to_char(s)).collect()
}

fn render_label(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|&s| match symbol_to_char(s) {
            Some(c) => c.to_string(),
            None if is_reserved(s) => "$".to_string(),
            None => format!("<{}>", s),
        })
        .collect()
}
