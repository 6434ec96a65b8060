//! Depth-first search for nodes matching a predicate.
//!
//! The walk is pre-order: a node is tested before its relationships are looked
//! at, and a node that matches is yielded without being expanded. Relationships
//! are followed in [`Node::relationships`] order. Visit tracking is keyed by
//! [`EdgeId`], so a node reached through two differently-kinded edges is
//! explored twice.
//!
//! Traversal runs on an explicit stack of frames rather than recursion, and the
//! result is a lazy iterator: dropping it stops the walk.

use graphwalk_core::config::{SearchConfig, VisitMarking};
use graphwalk_core::graph::{EdgeId, Graph, Node, NodeId, Relationship, Relationships};
use graphwalk_core::GraphError;
use std::collections::HashSet;
use std::convert::Infallible;

/// A depth-first search bound to one start node.
///
/// The searcher is a cheap copyable handle; every call to [`search`](Self::search)
/// or [`try_search`](Self::try_search) starts with an empty visited set.
#[derive(Debug)]
pub struct DepthFirstSearch<'g, T> {
    graph: &'g Graph<T>,
    start: NodeId,
    config: SearchConfig,
}

impl<T> Clone for DepthFirstSearch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DepthFirstSearch<'_, T> {}

impl<'g, T> DepthFirstSearch<'g, T> {
    /// Bind a search to `start`. Fails if `start` is not a node of `graph`.
    pub fn new(graph: &'g Graph<T>, start: NodeId) -> Result<Self, GraphError> {
        if !graph.contains(start) {
            return Err(GraphError::invalid(
                "start",
                format!("node {} is not part of this graph", start),
            ));
        }
        Ok(Self {
            graph,
            start,
            config: SearchConfig::default(),
        })
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn start(&self) -> &'g Node<T> {
        &self.graph[self.start]
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Lazily yield every node satisfying `predicate`, in discovery order.
    pub fn search<P>(self, mut predicate: P) -> impl Iterator<Item = &'g Node<T>>
    where
        P: FnMut(&Node<T>) -> bool,
    {
        self.try_search(move |node| Ok::<_, Infallible>(predicate(node)))
            .map(|found| match found {
                Ok(node) => node,
                Err(never) => match never {},
            })
    }

    /// Like [`search`](Self::search) with a fallible predicate.
    ///
    /// The first predicate error is yielded as-is and ends the search.
    pub fn try_search<P, E>(self, predicate: P) -> Matches<'g, T, P>
    where
        P: FnMut(&Node<T>) -> Result<bool, E>,
    {
        tracing::debug!(
            "depth-first search from '{}' (marking={}, max_depth={:?})",
            self.graph[self.start].id(),
            self.config.visit_marking,
            self.config.max_depth
        );
        Matches {
            graph: self.graph,
            predicate,
            config: self.config,
            visited: HashSet::new(),
            stack: Vec::new(),
            entering: Some(Entering {
                node: &self.graph[self.start],
                via: None,
                depth: 0,
            }),
            stats: SearchStats::default(),
            finished: false,
        }
    }
}

/// Counters describing how much of the graph a search has touched so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Predicate evaluations.
    pub nodes_tested: usize,
    /// Relationships not followed because their edge was already visited.
    pub edges_skipped: usize,
    /// Deepest hop count reached below the start node.
    pub max_depth_reached: usize,
}

/// A node about to be tested, with the relationship that led to it.
struct Entering<'g, T> {
    node: &'g Node<T>,
    via: Option<&'g Relationship>,
    depth: usize,
}

/// A node whose relationships are being walked.
struct Frame<'g> {
    edges: Relationships<'g>,
    via: Option<&'g Relationship>,
    depth: usize,
}

/// Lazy result of [`DepthFirstSearch::try_search`].
pub struct Matches<'g, T, P> {
    graph: &'g Graph<T>,
    predicate: P,
    config: SearchConfig,
    visited: HashSet<&'g EdgeId>,
    stack: Vec<Frame<'g>>,
    entering: Option<Entering<'g, T>>,
    stats: SearchStats,
    finished: bool,
}

impl<T, P> Matches<'_, T, P> {
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn finish(&mut self) {
        self.stack.clear();
        self.entering = None;
        if !self.finished {
            self.finished = true;
            tracing::debug!(
                "depth-first search finished: {} nodes tested, {} edges skipped, depth {}",
                self.stats.nodes_tested,
                self.stats.edges_skipped,
                self.stats.max_depth_reached
            );
        }
    }
}

impl<'g, T, P, E> Iterator for Matches<'g, T, P>
where
    P: FnMut(&Node<T>) -> Result<bool, E>,
{
    type Item = Result<&'g Node<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(Entering { node, via, depth }) = self.entering.take() {
                self.stats.nodes_tested += 1;
                self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);
                match (self.predicate)(node) {
                    Err(e) => {
                        tracing::trace!("predicate failed on '{}'", node.id());
                        self.finish();
                        return Some(Err(e));
                    }
                    Ok(true) => {
                        tracing::trace!("match '{}' at depth {}", node.id(), depth);
                        if self.config.visit_marking == VisitMarking::OnExit
                            && let Some(rel) = via
                        {
                            self.visited.insert(rel.edge_id());
                        }
                        return Some(Ok(node));
                    }
                    Ok(false) => self.stack.push(Frame {
                        edges: node.relationships(),
                        via,
                        depth,
                    }),
                }
            }

            let Some(frame) = self.stack.last_mut() else {
                self.finish();
                return None;
            };

            match frame.edges.next() {
                Some(rel) => {
                    if self.visited.contains(rel.edge_id()) {
                        self.stats.edges_skipped += 1;
                        tracing::trace!("skip visited edge {}", rel.edge_id());
                        continue;
                    }
                    if self
                        .config
                        .max_depth
                        .is_some_and(|limit| frame.depth >= limit)
                    {
                        continue;
                    }
                    if self.config.visit_marking == VisitMarking::OnEntry {
                        self.visited.insert(rel.edge_id());
                    }
                    self.entering = Some(Entering {
                        node: &self.graph[rel.target()],
                        via: Some(rel),
                        depth: frame.depth + 1,
                    });
                }
                None => {
                    if let Some(Frame { via: Some(rel), .. }) = self.stack.pop()
                        && self.config.visit_marking == VisitMarking::OnExit
                    {
                        self.visited.insert(rel.edge_id());
                    }
                }
            }
        }
    }
}
