use indexmap::IndexMap as _IndexMap;
use rustc_hash::FxBuildHasher;

/// Handle of a node inside its graph's arena.
///
/// Compact `u16` index bounds the number of nodes and keeps the child and
/// parent lists dense. Handles are only meaningful for the graph (or the
/// builder) that created them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeId(pub(crate) u16);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// `IndexMap` type with fast hasher.
///
/// Preserves insertion order, so label lookups and topology dumps follow
/// the order in which nodes were declared.
pub type IndexMap<K, V> = _IndexMap<K, V, FxBuildHasher>;
