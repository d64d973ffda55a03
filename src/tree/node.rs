use crate::state::request::{Point, Request, RequestId};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable node identity. Two builds of the same clustering produce the same
/// keys, which is what lets a collaborator carry state across rebuilds.
#[derive(Clone, Debug)]
pub enum NodeKey {
    Root,
    /// A childless cluster, i.e. a leaf holding one request.
    Request(RequestId),
    /// An internal cluster, identified by its radius and member list.
    Cluster { radius: f64, members: Vec<RequestId> },
}

impl NodeKey {
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKey::Request(_))
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            NodeKey::Request(id) => Some(*id),
            _ => None,
        }
    }
}

impl PartialEq for NodeKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeKey::Root, NodeKey::Root) => true,
            (NodeKey::Request(a), NodeKey::Request(b)) => a == b,
            (
                NodeKey::Cluster { radius: ra, members: ma },
                NodeKey::Cluster { radius: rb, members: mb },
            ) => ra.to_bits() == rb.to_bits() && ma == mb,
            _ => false,
        }
    }
}

impl Eq for NodeKey {}

impl Hash for NodeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            NodeKey::Root => {}
            NodeKey::Request(id) => id.hash(state),
            NodeKey::Cluster { radius, members } => {
                radius.to_bits().hash(state);
                members.hash(state);
            }
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Root => write!(f, "root"),
            NodeKey::Request(id) => write!(f, "{}", id),
            NodeKey::Cluster { radius, members } => {
                write!(f, "{}:", radius)?;
                for (i, id) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", id)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    key: NodeKey,
    label: String,
    point: Point,
    /// present on leaves only
    request: Option<Request>,
}

impl Node {
    pub fn new(id: NodeId, key: NodeKey, point: Point) -> Self {
        Self {
            id,
            label: key.to_string(),
            key,
            point,
            request: None,
        }
    }

    pub fn leaf(id: NodeId, request: Request) -> Self {
        let mut node = Self::new(id, NodeKey::Request(request.id()), *request.point());
        node.request = Some(request);
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn request_mut(&mut self) -> Option<&mut Request> {
        self.request.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels() {
        assert_eq!("root", NodeKey::Root.to_string());
        assert_eq!("7", NodeKey::Request(RequestId(7)).to_string());
        let cluster = NodeKey::Cluster {
            radius: 0.5,
            members: vec![RequestId(1), RequestId(4)],
        };
        assert_eq!("0.5:1,4", cluster.to_string());
        let cluster = NodeKey::Cluster {
            radius: 8.0,
            members: vec![RequestId(0)],
        };
        assert_eq!("8:0", cluster.to_string());
    }

    #[test]
    fn test_cluster_keys_hash_by_value() {
        let a = NodeKey::Cluster {
            radius: 4.0,
            members: vec![RequestId(0), RequestId(1)],
        };
        let b = NodeKey::Cluster {
            radius: 4.0,
            members: vec![RequestId(0), RequestId(1)],
        };
        let c = NodeKey::Cluster {
            radius: 2.0,
            members: vec![RequestId(0), RequestId(1)],
        };
        let set: HashSet<NodeKey> = [a, b, c].into_iter().collect();
        assert_eq!(2, set.len());
    }
}
