use crate::approximation::cluster::Cluster;
use crate::tree::edge::{Edge, EdgeId, EdgeKey};
use crate::tree::node::{Node, NodeId, NodeKey};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MetricInfo {
    pub diameter: f64,
    pub max_cluster_radius: f64,
}

/// Arena of nodes and edges. Everything is addressed by index; the engine and
/// the resolver mutate through [`Tree::edge_mut`] and [`Tree::node_mut`].
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    incoming: Vec<Option<EdgeId>>,
    children: Vec<Vec<EdgeId>>,
    index: HashMap<NodeKey, NodeId>,
    clusters: Vec<Cluster>,
    metric_info: MetricInfo,
}

impl Tree {
    pub fn new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        clusters: Vec<Cluster>,
        metric_info: MetricInfo,
    ) -> Self {
        let mut incoming: Vec<Option<EdgeId>> = vec![None; nodes.len()];
        let mut children: Vec<Vec<EdgeId>> = vec![Vec::new(); nodes.len()];
        edges.iter().for_each(|e| {
            children[e.from().index()].push(e.id());
            incoming[e.to().index()].get_or_insert(e.id());
        });
        let mut index = HashMap::with_capacity(nodes.len());
        nodes.iter().for_each(|n| {
            index.entry(n.key().clone()).or_insert(n.id());
        });
        Self {
            nodes,
            edges,
            incoming,
            children,
            index,
            clusters,
            metric_info,
        }
    }

    pub fn empty(metric_info: MetricInfo) -> Self {
        Self {
            metric_info,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn metric_info(&self) -> MetricInfo {
        self.metric_info
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_by_id(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn edge_by_id(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.index()]
    }

    pub fn node_by_key(&self, key: &NodeKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.node_by_key(&NodeKey::Root)
    }

    pub fn incoming(&self, id: NodeId) -> Option<EdgeId> {
        self.incoming[id.index()]
    }

    pub fn outgoing(&self, id: NodeId) -> &[EdgeId] {
        &self.children[id.index()]
    }

    /// Edges hanging below `id`'s destination.
    pub fn child_edges(&self, id: EdgeId) -> &[EdgeId] {
        self.outgoing(self.edge_by_id(id).to())
    }

    /// The edge whose destination is `id`'s source.
    pub fn parent_edge(&self, id: EdgeId) -> Option<EdgeId> {
        self.incoming(self.edge_by_id(id).from())
    }

    /// `id` followed by every edge below it, depth first.
    pub fn subtree_edges(&self, id: EdgeId) -> Vec<EdgeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.child_edges(current).iter().rev());
        }
        result
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.key().is_leaf())
    }

    pub fn edge_key(&self, id: EdgeId) -> EdgeKey {
        let edge = self.edge_by_id(id);
        EdgeKey {
            from: self.node_by_id(edge.from()).key().clone(),
            to: self.node_by_id(edge.to()).key().clone(),
        }
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<EdgeId> {
        let from = self.node_by_key(&key.from)?;
        let to = self.node_by_key(&key.to)?;
        self.incoming(to)
            .filter(|e| self.edge_by_id(*e).from() == from)
    }

    /// Edges from `id` up to the root, or `None` when the walk breaks off
    /// before reaching it.
    fn root_chain(&self, id: NodeId) -> Option<Vec<EdgeId>> {
        let mut chain = Vec::new();
        let mut current = id;
        while !matches!(self.node_by_id(current).key(), NodeKey::Root) {
            let edge = self.incoming(current)?;
            chain.push(edge);
            current = self.edge_by_id(edge).from();
            if chain.len() > self.edges.len() {
                return None;
            }
        }
        Some(chain)
    }

    /// Tree path between two nodes ordered from `from` to `to`, through their
    /// deepest common ancestor. Empty when the nodes coincide or are not
    /// connected through the root.
    pub fn path_between(&self, from: NodeId, to: NodeId) -> Vec<EdgeId> {
        if from == to {
            return Vec::new();
        }
        let (Some(up_from), Some(up_to)) = (self.root_chain(from), self.root_chain(to)) else {
            return Vec::new();
        };

        let mut depth_from: HashMap<NodeId, usize> = HashMap::with_capacity(up_from.len() + 1);
        depth_from.insert(from, 0);
        up_from.iter().enumerate().for_each(|(i, e)| {
            depth_from.insert(self.edge_by_id(*e).from(), i + 1);
        });

        let ancestors_of_to = std::iter::once(to).chain(up_to.iter().map(|e| self.edge_by_id(*e).from()));
        let Some((j, i)) = ancestors_of_to
            .enumerate()
            .find_map(|(j, n)| depth_from.get(&n).map(|i| (j, *i)))
        else {
            return Vec::new();
        };

        up_from[..i]
            .iter()
            .copied()
            .chain(up_to[..j].iter().rev().copied())
            .collect()
    }

    /// Longest edge on `path`. Equal lengths resolve toward the end of the
    /// path, i.e. the request side when the path runs server → request.
    pub fn major_edge(&self, path: &[EdgeId]) -> Option<EdgeId> {
        path.iter().copied().reduce(|best, e| {
            if self.edge_by_id(e).length() >= self.edge_by_id(best).length() {
                e
            } else {
                best
            }
        })
    }
}
