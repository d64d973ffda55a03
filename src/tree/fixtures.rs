//! Hand-assembled trees for unit tests.

use crate::state::request::{Point, Request, RequestId};
use crate::tree::edge::{Edge, EdgeId};
use crate::tree::node::{Node, NodeId, NodeKey};
use crate::tree::tree::{MetricInfo, Tree};

pub const ROOT: NodeId = NodeId(0);

pub struct TreeFixture {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl TreeFixture {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(ROOT, NodeKey::Root, Point::ORIGIN)],
            edges: Vec::new(),
        }
    }

    pub fn cluster(&mut self, parent: NodeId, length: f64) -> (NodeId, EdgeId) {
        let id = NodeId(self.nodes.len());
        let key = NodeKey::Cluster {
            radius: length,
            members: vec![RequestId(10_000 + id.0 as u32)],
        };
        self.nodes.push(Node::new(id, key, Point::ORIGIN));
        (id, self.link(parent, id, length))
    }

    pub fn leaf(&mut self, parent: NodeId, length: f64, rid: u32) -> (NodeId, EdgeId) {
        self.leaf_with(parent, length, Request::new(RequestId(rid), Point::ORIGIN))
    }

    pub fn leaf_with(&mut self, parent: NodeId, length: f64, request: Request) -> (NodeId, EdgeId) {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::leaf(id, request));
        (id, self.link(parent, id, length))
    }

    fn link(&mut self, from: NodeId, to: NodeId, length: f64) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge::new(id, from, to, length));
        id
    }

    pub fn build(self) -> Tree {
        Tree::new(self.nodes, self.edges, vec![], MetricInfo::default())
    }
}
