use crate::{
    sync::Mutex,
    task::Task,
    types::{IndexMap, NodeId},
};
use derive_more::Debug;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::info;

/// Error returned by [`GraphBuilder`] when the requested topology cannot be
/// executed.
///
/// Everything here is caught once, at build time; the run loop trusts the
/// topology and never re-validates it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// A label was used for more than one node.
    #[error("label `{0}` is already taken")]
    DuplicateLabel(char),
    /// The graph has no nodes at all.
    #[error("graph is empty")]
    Empty,
    /// Every node has at least one parent.
    #[error("graph has no source node")]
    NoSource,
    /// More than one node has no parents.
    #[error("graph has multiple source nodes: `{0}` and `{1}`")]
    MultipleSources(char, char),
    /// Every node has at least one child.
    #[error("graph has no sink node")]
    NoSink,
    /// More than one node has no children.
    #[error("graph has multiple sink nodes: `{0}` and `{1}`")]
    MultipleSinks(char, char),
    /// The edges contain a cycle, so no traversal order exists.
    #[error("graph contains cycle(s)")]
    Cycle,
}

/// One slot of the node arena.
///
/// Topology fields are frozen by [`GraphBuilder::build`]; `satisfied` is
/// the only thing that mutates afterwards, under its own lock. The parent
/// list is not consumed by the dispatch path but is kept for reverse
/// traversal by embedders.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) label: char,
    #[debug(skip)]
    pub(crate) task: Box<dyn Task>,
    /// Incoming edge count, fixed once the graph is built.
    pub(crate) required: u32,
    /// Parents that have completed so far in the current cycle. Bounded by
    /// `required`; back to zero before any child of this node starts.
    #[debug(skip)]
    pub(crate) satisfied: Mutex<u32>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parents: Vec<NodeId>,
}

/// Incremental construction of a [`TaskGraph`].
///
/// Create nodes with [`node`](Self::node), wire edges with
/// [`link`](Self::link), then freeze and validate with
/// [`build`](Self::build). Handles returned by `node` are plain arena
/// indices and stay valid across the build.
#[must_use]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    labels: IndexMap<char, NodeId>,
}

impl GraphBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node running `task`.
    ///
    /// Labels identify nodes in lookups, logs and traces, and must be
    /// unique within the graph.
    pub fn node(&mut self, label: char, task: impl Task + 'static) -> Result<NodeId, GraphError> {
        if self.labels.contains_key(&label) {
            return Err(GraphError::DuplicateLabel(label));
        }
        let id = NodeId(
            self.nodes
                .len()
                .try_into()
                .expect("GraphBuilder::node: [1]"),
        );
        self.nodes.push(Node {
            label,
            task: Box::new(task),
            required: 0,
            satisfied: Mutex::new(0),
            children: Vec::new(),
            parents: Vec::new(),
        });
        self.labels.insert(label, id);
        Ok(id)
    }

    /// Add the edge `parent → child`.
    ///
    /// Appends to the parent's child list and the child's parent list, and
    /// raises the child's required in-degree by one. Duplicate edges are
    /// not detected.
    ///
    /// # Panics
    /// If `parent` and `child` are the same node.
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        assert_ne!(
            parent, child,
            "node `{}` is linked to itself",
            self.nodes[parent.index()].label
        );
        self.nodes[parent.index()].children.push(child);
        let child_node = &mut self.nodes[child.index()];
        child_node.parents.push(parent);
        child_node.required += 1;
    }

    /// Look up a node by label.
    pub fn find(&self, label: char) -> Option<NodeId> {
        self.labels.get(&label).copied()
    }

    /// Validate the topology and freeze it.
    ///
    /// Checks that the graph is non-empty, has exactly one parentless node
    /// (the source) and exactly one childless node (the sink), and is
    /// acyclic. Acyclicity is established by Kahn-style elimination over a
    /// scratch copy of the in-degrees; if the elimination cannot place
    /// every node, a cyclic component remains.
    pub fn build(self) -> Result<TaskGraph, GraphError> {
        let Self { nodes, labels } = self;
        if nodes.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut source = None;
        let mut sink = None;
        for (idx, node) in nodes.iter().enumerate() {
            let id = NodeId(idx.try_into().expect("GraphBuilder::build: [1]"));
            if node.parents.is_empty() {
                match source {
                    None => source = Some(id),
                    Some(first) => {
                        return Err(GraphError::MultipleSources(
                            nodes[first.index()].label,
                            node.label,
                        ));
                    }
                }
            }
            if node.children.is_empty() {
                match sink {
                    None => sink = Some(id),
                    Some(first) => {
                        return Err(GraphError::MultipleSinks(
                            nodes[first.index()].label,
                            node.label,
                        ));
                    }
                }
            }
        }
        let source = source.ok_or(GraphError::NoSource)?;
        let sink = sink.ok_or(GraphError::NoSink)?;

        let mut in_degrees: Vec<u32> = nodes.iter().map(|node| node.required).collect();
        let mut ready: VecDeque<usize> = in_degrees
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(idx, _)| idx)
            .collect();
        let mut placed = 0usize;
        while let Some(idx) = ready.pop_front() {
            placed += 1;
            for &child in &nodes[idx].children {
                let degree = &mut in_degrees[child.index()];
                *degree = degree.checked_sub(1).expect("GraphBuilder::build: [2]");
                if *degree == 0 {
                    ready.push_back(child.index());
                }
            }
        }
        if placed != nodes.len() {
            return Err(GraphError::Cycle);
        }

        Ok(TaskGraph {
            nodes,
            labels,
            source,
            sink,
        })
    }
}

/// Immutable task topology plus the per-node runtime counters.
///
/// Owns every node in a flat arena; edges are arena indices in both
/// directions, so the bidirectional child/parent lists never form an
/// ownership cycle. After [`GraphBuilder::build`] the topology is frozen;
/// the only runtime mutation is each node's satisfied counter, and a
/// finished run leaves all of them back at zero, so the same graph can be
/// handed to another engine.
#[must_use]
#[derive(Debug)]
pub struct TaskGraph {
    nodes: Vec<Node>,
    labels: IndexMap<char, NodeId>,
    source: NodeId,
    sink: NodeId,
}

impl TaskGraph {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes. Always `false` for a built graph.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The unique node without parents; seeded at every cycle start.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The unique node without children; its completion ends a cycle.
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// Look up a node by label.
    pub fn find(&self, label: char) -> Option<NodeId> {
        self.labels.get(&label).copied()
    }

    /// The node's label.
    pub fn label(&self, id: NodeId) -> char {
        self.nodes[id.index()].label
    }

    /// Downstream neighbours of the node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Upstream neighbours of the node.
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].parents
    }

    /// The node's required in-degree, fixed at build time.
    pub fn required(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].required
    }

    /// Locked read of the node's current satisfied count.
    ///
    /// Diagnostics only: between cycles this is always zero, and mid-cycle
    /// readings are stale the moment the lock is released.
    pub fn satisfied(&self, id: NodeId) -> u32 {
        *self.nodes[id.index()]
            .satisfied
            .lock()
            .expect("TaskGraph::satisfied")
    }

    /// All node handles, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.labels.values().copied()
    }

    /// All labels, in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = char> + '_ {
        self.labels.keys().copied()
    }

    /// Log the topology, one `info!` line per node in declaration order.
    pub fn log_topology(&self) {
        for &id in self.labels.values() {
            let node = &self.nodes[id.index()];
            let children: String = node
                .children
                .iter()
                .flat_map(|&child| [' ', self.nodes[child.index()].label])
                .collect();
            info!("NODE {} -->{children}", node.label);
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}
