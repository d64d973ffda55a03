//! Greedy ball clustering of a planar point set into an HST.
//!
//! The root's children have radius `2^(ceil(log2 D) - 1) * beta` where `D` is
//! the point set diameter; every further level halves the radius until it
//! drops to 1 or below. Cluster assignment follows input order: the first
//! point of a group becomes its center, so reordering the input can change the
//! tree even though the diameter stays the same.
//!
//! Coordinates far enough apart to overflow the diameter collapse to unit
//! balls under the root. Distances involving a NaN coordinate never grow the
//! diameter, and such a point never joins another point's ball.

use crate::approximation::cluster::Cluster;
use crate::state::request::{Point, Request, RequestId};
use crate::tree::edge::{Edge, EdgeId};
use crate::tree::node::{Node, NodeId, NodeKey};
use crate::tree::tree::{MetricInfo, Tree};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproximationOptions {
    pub beta_coefficient: f64,
    /// Stop subdividing clusters that already hold a single point.
    pub lazy: bool,
}

impl ApproximationOptions {
    const DEFAULT_BETA: f64 = 1.0;

    /// Non-finite or non-positive coefficients fall back to 1.
    pub fn beta(&self) -> f64 {
        if self.beta_coefficient.is_finite() && self.beta_coefficient > 0.0 {
            self.beta_coefficient
        } else {
            Self::DEFAULT_BETA
        }
    }
}

impl Default for ApproximationOptions {
    fn default() -> Self {
        Self {
            beta_coefficient: Self::DEFAULT_BETA,
            lazy: false,
        }
    }
}

pub fn metric_diameter(requests: &[Request]) -> f64 {
    requests
        .iter()
        .enumerate()
        .flat_map(|(i, p)| requests[i + 1..].iter().map(move |q| p.point().distance(q.point())))
        .fold(0.0, f64::max)
}

pub fn build(requests: &[Request], options: &ApproximationOptions) -> Tree {
    let diameter = metric_diameter(requests);
    if diameter <= 0.0 {
        debug!(points = requests.len(), "degenerate point set, root-only tree");
        let root = Node::new(NodeId(0), NodeKey::Root, Point::ORIGIN);
        return Tree::new(vec![root], vec![], vec![], MetricInfo::default());
    }

    // an overflowing diameter has no usable level count; build unit balls
    let delta = match diameter.log2().ceil() {
        d if d.is_finite() => d,
        _ => {
            warn!(diameter, "non-finite diameter, falling back to unit radius");
            1.0
        }
    };
    if delta < 1.0 {
        debug!(diameter, "diameter within one unit, empty tree");
        return Tree::empty(MetricInfo {
            diameter,
            max_cluster_radius: 0.0,
        });
    }

    let top = 2f64.powf(delta - 1.0);
    let max_cluster_radius = match top * options.beta() {
        r if r.is_finite() => r,
        _ => {
            warn!(beta = options.beta_coefficient, "scaled radius overflows, using beta 1");
            top
        }
    };
    let points: Vec<&Request> = requests.iter().collect();
    let clusters = approximate(&points, max_cluster_radius, options.lazy);

    debug!(
        diameter,
        delta,
        max_cluster_radius,
        clusters = clusters.iter().map(Cluster::count).sum::<usize>(),
        "approximated metric"
    );

    let mut flattener = Flattener::new(requests);
    let root = flattener.push_root();
    clusters.iter().for_each(|c| flattener.visit(c, root));

    Tree::new(
        flattener.nodes,
        flattener.edges,
        clusters,
        MetricInfo {
            diameter,
            max_cluster_radius,
        },
    )
}

fn approximate(points: &[&Request], radius: f64, lazy: bool) -> Vec<Cluster> {
    if radius <= 1.0 || (lazy && points.len() == 1) {
        return points.iter().map(|p| Cluster::singleton(p, radius)).collect();
    }

    let mut groups: Vec<(&Request, Vec<&Request>)> = Vec::new();
    for &point in points {
        match groups
            .iter_mut()
            .find(|(center, _)| center.point().distance(point.point()) < radius)
        {
            Some((_, members)) => members.push(point),
            None => groups.push((point, vec![point])),
        }
    }

    groups
        .into_iter()
        .map(|(center, members)| {
            let children = if !lazy || members.len() > 1 {
                approximate(&members, radius / 2.0, lazy)
            } else {
                Vec::new()
            };
            Cluster::new(center, radius, &members, children)
        })
        .collect()
}

struct Flattener<'a> {
    lookup: HashMap<RequestId, &'a Request>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl<'a> Flattener<'a> {
    fn new(requests: &'a [Request]) -> Self {
        Self {
            lookup: requests.iter().map(|r| (r.id(), r)).collect(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn push_root(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, NodeKey::Root, Point::ORIGIN));
        id
    }

    fn visit(&mut self, cluster: &Cluster, parent: NodeId) {
        let id = NodeId(self.nodes.len());
        let node = match (cluster.key(), self.lookup.get(&cluster.center())) {
            (NodeKey::Request(_), Some(request)) => Node::leaf(id, (*request).clone()),
            (key, _) => Node::new(id, key, *cluster.point()),
        };
        self.nodes.push(node);
        self.edges
            .push(Edge::new(EdgeId(self.edges.len()), parent, id, cluster.radius()));
        cluster.children().iter().for_each(|c| self.visit(c, id));
    }
}
