//! Edges and the per-node edge bag.

use smallvec::SmallVec;

use crate::{EdgeId, NodeId, Symbol, TextId};

/// A slice `[start, end)` of one stored text.
///
/// Leaf labels are open: they carry no end and always run to the end of their
/// text, terminator included. Every leaf created while a text is inserted
/// extends with it for free, and splitting a leaf label closes only its upper
/// half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub(crate) text: TextId,
    pub(crate) start: u32,
    pub(crate) end: Option<u32>,
}

impl Label {
    pub(crate) const fn open(text: TextId, start: u32) -> Self {
        Self { text, start, end: None }
    }

    /// Text the label points into.
    pub fn text(&self) -> TextId {
        self.text
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// End offset, resolving an open label against its text's length.
    pub(crate) fn end(&self, text_len: u32) -> u32 {
        self.end.unwrap_or(text_len)
    }
}

/// A tree edge. The parent owns it through its [`EdgeBag`]; `source` is the
/// back reference used to rebuild path texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub(crate) label: Label,
    pub(crate) source: NodeId,
    pub(crate) dest: NodeId,
}

impl Edge {
    pub fn label(&self) -> Label {
        self.label
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn dest(&self) -> NodeId {
        self.dest
    }
}

/// Outgoing edges of a node keyed by their first symbol.
///
/// Fan-out is bounded by the alphabet and usually tiny, so lookups scan an
/// inline vector instead of hashing.
#[derive(Debug, Clone, Default)]
pub struct EdgeBag {
    entries: SmallVec<[(Symbol, EdgeId); 4]>,
}

impl EdgeBag {
    pub fn get(&self, symbol: Symbol) -> Option<EdgeId> {
        self.entries
            .iter()
            .find(|(key, _)| *key == symbol)
            .map(|&(_, edge)| edge)
    }

    /// Files `edge` under `symbol`, handing back the edge it displaced.
    /// A displaced edge means two edges of one node shared a first symbol.
    pub(crate) fn put(&mut self, symbol: Symbol, edge: EdgeId) -> Option<EdgeId> {
        if let Some(slot) = self.entries.iter_mut().find(|(key, _)| *key == symbol) {
            return Some(std::mem::replace(&mut slot.1, edge));
        }
        self.entries.push((symbol, edge));
        None
    }

    /// Appends without the duplicate check.
    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, symbol: Symbol, edge: EdgeId) {
        self.entries.push((symbol, edge));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.entries.iter().map(|&(_, edge)| edge)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, EdgeId)> + '_ {
        self.entries.iter().copied()
    }
}
