//! Graph data model: an arena of identified nodes joined by kind-labelled relationships.

use crate::error::GraphError;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::Index;

/// Stable handle to a node inside a [`Graph`] arena.
///
/// Handles are only meaningful for the graph that issued them. Nodes are never
/// removed, so a handle stays valid for the lifetime of its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of an edge during traversal: `"{kind}-{target id}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(kind: &str, target_id: &str) -> Self {
        Self(format!("{}-{}", kind, target_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed, kind-labelled edge. Owned by its source node, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    kind: String,
    target: NodeId,
    edge_id: EdgeId,
}

impl Relationship {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Handle of the node this relationship points at.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn edge_id(&self) -> &EdgeId {
        &self.edge_id
    }
}

/// Outgoing relationships: kind → target id → relationship.
type Adjacency = BTreeMap<String, BTreeMap<String, Relationship>>;

/// An identified node carrying a domain payload `T`.
#[derive(Debug, Clone)]
pub struct Node<T = ()> {
    handle: NodeId,
    id: String,
    data: T,
    relationships: Adjacency,
}

impl<T> Node<T> {
    pub fn handle(&self) -> NodeId {
        self.handle
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// All outgoing relationships, ordered by kind and then by target id.
    pub fn relationships(&self) -> Relationships<'_> {
        Relationships {
            kinds: self.relationships.values(),
            current: None,
        }
    }

    /// Look up the relationship of `kind` pointing at the node with `target_id`.
    pub fn relationship(&self, kind: &str, target_id: &str) -> Option<&Relationship> {
        self.relationships.get(kind)?.get(target_id)
    }

    /// Relationship kinds present on this node, in order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(kind, _)| kind.as_str())
    }

    /// Number of outgoing relationships.
    pub fn degree(&self) -> usize {
        self.relationships.values().map(BTreeMap::len).sum()
    }
}

/// Read-only iterator over a node's outgoing relationships.
#[derive(Debug, Clone)]
pub struct Relationships<'a> {
    kinds: btree_map::Values<'a, String, BTreeMap<String, Relationship>>,
    current: Option<btree_map::Values<'a, String, Relationship>>,
}

impl<'a> Iterator for Relationships<'a> {
    type Item = &'a Relationship;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = &mut self.current
                && let Some(rel) = current.next()
            {
                return Some(rel);
            }
            self.current = Some(self.kinds.next()?.values());
        }
    }
}

/// A directed, labelled multigraph stored as an arena of nodes.
///
/// There is no notion of a graph root here; what a search sees is whatever is
/// reachable from the node it starts at.
#[derive(Debug, Clone)]
pub struct Graph<T = ()> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a node with no relationships. Ids are not checked for uniqueness.
    pub fn new_node(&mut self, id: impl Into<String>, data: T) -> NodeId {
        let handle = NodeId(self.nodes.len());
        self.nodes.push(Node {
            handle,
            id: id.into(),
            data,
            relationships: BTreeMap::new(),
        });
        handle
    }

    /// Add the edge `source --kind--> target`.
    ///
    /// Returns `Ok(false)` when `source` already holds a relationship of `kind`
    /// to a node with the target's id; the graph is left unchanged.
    pub fn add_relationship(
        &mut self,
        source: NodeId,
        kind: &str,
        target: NodeId,
    ) -> Result<bool, GraphError> {
        if kind.is_empty() {
            return Err(GraphError::invalid(
                "kind",
                "relationship kind must not be empty",
            ));
        }
        let target_id = self.checked("target", target)?.id.clone();
        self.checked("source", source)?;

        let by_target = self.nodes[source.0]
            .relationships
            .entry(kind.to_string())
            .or_default();
        if by_target.contains_key(&target_id) {
            return Ok(false);
        }
        let edge_id = EdgeId::new(kind, &target_id);
        by_target.insert(
            target_id,
            Relationship {
                kind: kind.to_string(),
                target,
                edge_id,
            },
        );
        Ok(true)
    }

    /// Outgoing relationships of `node`.
    pub fn relationships_of(&self, node: NodeId) -> Result<Relationships<'_>, GraphError> {
        Ok(self.checked("node", node)?.relationships())
    }

    pub fn node(&self, handle: NodeId) -> Option<&Node<T>> {
        self.nodes.get(handle.0)
    }

    pub fn contains(&self, handle: NodeId) -> bool {
        handle.0 < self.nodes.len()
    }

    /// First node created with the given id.
    pub fn find(&self, id: &str) -> Option<&Node<T>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> std::slice::Iter<'_, Node<T>> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of relationships across all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(Node::degree).sum()
    }

    fn checked(&self, name: &'static str, handle: NodeId) -> Result<&Node<T>, GraphError> {
        self.nodes.get(handle.0).ok_or_else(|| {
            GraphError::invalid(
                name,
                format!(
                    "node {} is not part of this graph ({} nodes)",
                    handle,
                    self.nodes.len()
                ),
            )
        })
    }
}

impl<T> Index<NodeId> for Graph<T> {
    type Output = Node<T>;

    fn index(&self, handle: NodeId) -> &Node<T> {
        &self.nodes[handle.0]
    }
}
