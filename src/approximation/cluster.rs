use crate::state::request::{Point, Request, RequestId};
use crate::tree::node::NodeKey;

/// A ball of requests around a center, subdivided into half-radius balls.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    center: RequestId,
    point: Point,
    radius: f64,
    members: Vec<RequestId>,
    children: Vec<Cluster>,
}

impl Cluster {
    pub fn new(center: &Request, radius: f64, members: &[&Request], children: Vec<Cluster>) -> Self {
        Self {
            center: center.id(),
            point: *center.point(),
            radius,
            members: members.iter().map(|r| r.id()).collect(),
            children,
        }
    }

    pub fn singleton(center: &Request, radius: f64) -> Self {
        Self::new(center, radius, &[center], Vec::new())
    }

    pub fn center(&self) -> RequestId {
        self.center
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn members(&self) -> &[RequestId] {
        &self.members
    }

    pub fn children(&self) -> &[Cluster] {
        &self.children
    }

    /// Childless clusters are named after their center request, internal
    /// ones after their radius and membership.
    pub fn key(&self) -> NodeKey {
        if self.children.is_empty() {
            NodeKey::Request(self.center)
        } else {
            NodeKey::Cluster {
                radius: self.radius,
                members: self.members.clone(),
            }
        }
    }

    /// Number of clusters in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Cluster::count).sum::<usize>()
    }
}
