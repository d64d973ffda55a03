use crate::config::ForwardingConfig;
use crate::error::OsdResult;
use crate::service::forwarding::TimeForwarder;
use crate::service::subtree::{critical_subtree, key_edges, relevant_subtree};
use crate::simulation::engine::SaturationEngine;
use crate::state::edge_state::EdgeState;
use crate::state::request::{Lifecycle, Request, RequestId};
use crate::state::server::{Position, ServerTrail};
use crate::tree::edge::EdgeId;
use crate::tree::node::NodeKey;
use crate::tree::tree::Tree;
use tracing::{debug, info};

/// First pending request whose major edge, seen from the server, is full.
#[derive(Clone, Debug, PartialEq)]
pub struct SaturatedRequest {
    pub request: RequestId,
    pub major_edge: EdgeId,
    /// server → request
    pub path: Vec<EdgeId>,
}

/// Edges marked for service and where the server ends up afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ServicingPath {
    edges: Vec<EdgeId>,
    new_server: Position,
}

impl ServicingPath {
    pub fn new(edges: Vec<EdgeId>, new_server: Position) -> Self {
        Self { edges, new_server }
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn new_server(&self) -> &Position {
        &self.new_server
    }
}

pub fn check_saturation(
    tree: &Tree,
    server: &Position,
    requests: &[Request],
) -> Option<SaturatedRequest> {
    let server_node = tree.node_by_key(&server.key)?;
    requests
        .iter()
        .filter(|r| r.is_pending())
        .find_map(|r| {
            let node = tree.node_by_key(&NodeKey::Request(r.id()))?;
            let path = tree.path_between(server_node, node);
            let major_edge = tree.major_edge(&path)?;
            tree.edge_by_id(major_edge)
                .is_saturated()
                .then(|| SaturatedRequest {
                    request: r.id(),
                    major_edge,
                    path,
                })
        })
}

/// Decides when the server moves and what it clears on the way.
#[derive(Clone, Debug)]
pub struct ServiceResolver {
    engine: SaturationEngine,
    forwarding: ForwardingConfig,
    single_servicing: bool,
}

impl ServiceResolver {
    pub fn new(engine: SaturationEngine, forwarding: ForwardingConfig, single_servicing: bool) -> Self {
        Self {
            engine,
            forwarding,
            single_servicing,
        }
    }

    /// Marks the edges to service and reports them, or `None` when no
    /// request's major edge is saturated yet.
    pub fn resolve(
        &self,
        tree: &mut Tree,
        trail: &ServerTrail,
        requests: &[Request],
    ) -> OsdResult<Option<ServicingPath>> {
        let Some(found) = check_saturation(tree, trail.current(), requests) else {
            return Ok(None);
        };
        let major = found.major_edge;

        let relevant = relevant_subtree(tree, major);
        let critical = critical_subtree(tree, major, &relevant);
        let keys = key_edges(tree, major, &critical).edges;
        debug!(
            request = %found.request,
            major = major.index(),
            relevant = relevant.len(),
            critical = critical.len(),
            keys = keys.len(),
            "saturated major edge"
        );

        let forwarder = TimeForwarder::new(&self.engine, self.forwarding);
        let mut edges = critical;
        for key in &keys {
            edges.push(*key);
            edges.extend(forwarder.forward(tree, major)?);
        }
        let mut unique: Vec<EdgeId> = Vec::with_capacity(edges.len());
        for e in edges {
            if !unique.contains(&e) {
                unique.push(e);
            }
        }

        let Some(last_key) = keys.last() else {
            return Ok(None);
        };
        let destination = tree.node_by_id(tree.edge_by_id(*last_key).to());
        let new_server = Position::new(destination.key().clone(), *destination.point());

        for e in &unique {
            tree.edge_mut(*e).set_state(EdgeState::Servicing);
        }

        info!(
            request = %found.request,
            edges = unique.len(),
            server = %new_server.key,
            "servicing path resolved"
        );
        Ok(Some(ServicingPath::new(unique, new_server)))
    }

    /// Clears the serviced edges and moves the server along them.
    pub fn apply(
        &self,
        tree: &mut Tree,
        path: &ServicingPath,
        trail: &mut ServerTrail,
        requests: &mut [Request],
    ) {
        for e in path.edges() {
            tree.edge_mut(*e).reset();
            let node = tree.node_mut(tree.edge_by_id(*e).to());
            let position = Position::new(node.key().clone(), *node.point());
            let Some(request) = node.request_mut() else {
                continue;
            };

            request.set_elapsed(0.0);
            if self.single_servicing {
                request.set_lifecycle(Lifecycle::Serviced);
            }
            let id = request.id();
            if let Some(entry) = requests.iter_mut().find(|r| r.id() == id) {
                entry.set_elapsed(0.0);
                if self.single_servicing {
                    entry.set_lifecycle(Lifecycle::Serviced);
                }
            }
            trail.push(position);
        }
        trail.push(path.new_server().clone());
        info!(edges = path.edges().len(), server = %path.new_server().key, "servicing applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::request::Point;
    use crate::tree::fixtures::{ROOT, TreeFixture};
    use crate::tree::node::NodeId;
    use approx::assert_relative_eq;

    fn fill(tree: &mut Tree, edges: &[EdgeId]) {
        for e in edges {
            let length = tree.edge_by_id(*e).length();
            tree.edge_mut(*e).set_value(length);
        }
    }

    fn requests(ids: &[u32]) -> Vec<Request> {
        ids.iter()
            .map(|id| Request::new(RequestId(*id), Point::ORIGIN))
            .collect()
    }

    //         root
    //          | 8 (top)
    //          c
    //       4 / \ 4
    //        a   d (leaf 3)
    //     2 / \ 2
    //      l0  l1
    struct Sample {
        tree: Tree,
        c: NodeId,
        top: EdgeId,
        a: EdgeId,
        d: EdgeId,
        l0: EdgeId,
        l1: EdgeId,
    }

    fn sample() -> Sample {
        let mut f = TreeFixture::new();
        let (c, top) = f.cluster(ROOT, 8.0);
        let (an, a) = f.cluster(c, 4.0);
        let (_, d) = f.leaf(c, 4.0, 3);
        let (_, l0) = f.leaf(an, 2.0, 0);
        let (_, l1) = f.leaf(an, 2.0, 1);
        Sample {
            tree: f.build(),
            c,
            top,
            a,
            d,
            l0,
            l1,
        }
    }

    fn resolver(single_servicing: bool) -> ServiceResolver {
        ServiceResolver::new(
            SaturationEngine::default(),
            ForwardingConfig::default(),
            single_servicing,
        )
    }

    #[test]
    fn test_check_saturation_takes_first_match_in_list_order() {
        // two branches straight under the root
        let mut f = TreeFixture::new();
        let (_, first) = f.leaf(ROOT, 4.0, 0);
        let (_, second) = f.leaf(ROOT, 4.0, 1);
        let mut tree = f.build();
        fill(&mut tree, &[second]);

        let found = check_saturation(&tree, &Position::root(), &requests(&[0, 1])).unwrap();
        assert_eq!(RequestId(1), found.request);
        assert_eq!(second, found.major_edge);
        assert_eq!(vec![second], found.path);

        fill(&mut tree, &[first]);
        let found = check_saturation(&tree, &Position::root(), &requests(&[0, 1])).unwrap();
        assert_eq!(RequestId(0), found.request);
    }

    #[test]
    fn test_check_saturation_skips_serviced_and_unknown_requests() {
        let mut s = sample();
        fill(&mut s.tree, &[s.top]);
        let mut list = requests(&[42, 0]);
        list[1].set_lifecycle(Lifecycle::Serviced);
        assert!(check_saturation(&s.tree, &Position::root(), &list).is_none());
    }

    #[test]
    fn test_unknown_server_position_yields_nothing() {
        let mut s = sample();
        fill(&mut s.tree, &[s.top]);
        let lost = Position::new(NodeKey::Request(RequestId(99)), Point::ORIGIN);
        assert!(check_saturation(&s.tree, &lost, &requests(&[0])).is_none());
    }

    #[test]
    fn test_resolve_without_saturation_is_none() {
        let mut s = sample();
        let path = resolver(false)
            .resolve(&mut s.tree, &ServerTrail::default(), &requests(&[0, 1, 3]))
            .unwrap();
        assert!(path.is_none());
        assert!(s.tree.edges().iter().all(|e| e.state() == EdgeState::Saturating));
    }

    #[test]
    fn test_resolve_collects_critical_key_and_forwarded_edges() {
        let mut s = sample();
        fill(&mut s.tree, &[s.top, s.a, s.l0, s.l1]);

        let path = resolver(false)
            .resolve(&mut s.tree, &ServerTrail::default(), &requests(&[0, 1, 3]))
            .unwrap()
            .unwrap();

        // critical {top, a, l0, l1}, key {top}, forwarded {l0, l1, d}
        assert_eq!(&[s.top, s.a, s.l0, s.l1, s.d], path.edges());
        assert_eq!(s.tree.node_by_id(s.c).key(), &path.new_server().key);
        for e in path.edges() {
            assert_eq!(EdgeState::Servicing, s.tree.edge_by_id(*e).state());
        }
        // d was driven to saturation by the synthetic clock
        assert!(s.tree.edge_by_id(s.d).is_saturated());
    }

    #[test]
    fn test_apply_resets_edges_and_moves_server() {
        let mut s = sample();
        fill(&mut s.tree, &[s.top, s.a, s.l0, s.l1]);
        let resolver = resolver(false);
        let mut trail = ServerTrail::default();
        let mut list = requests(&[0, 1, 3]);

        let path = resolver
            .resolve(&mut s.tree, &trail, &list)
            .unwrap()
            .unwrap();
        resolver.apply(&mut s.tree, &path, &mut trail, &mut list);

        for e in path.edges() {
            let edge = s.tree.edge_by_id(*e);
            assert_relative_eq!(0.0, edge.value());
            assert_eq!(EdgeState::Saturating, edge.state());
        }
        let visited: Vec<String> = trail.positions().iter().map(|p| p.key.to_string()).collect();
        let c_label = s.tree.node_by_id(s.c).label().to_string();
        assert_eq!(vec!["root".to_string(), "0".into(), "1".into(), "3".into(), c_label], visited);

        for leaf in s.tree.leaves() {
            let request = leaf.request().unwrap();
            assert_relative_eq!(0.0, request.elapsed());
            assert!(request.is_pending());
        }
        assert!(list.iter().all(|r| r.is_pending()));
    }

    #[test]
    fn test_single_servicing_retires_requests() {
        let mut s = sample();
        fill(&mut s.tree, &[s.top, s.a, s.l0, s.l1]);
        let resolver = resolver(true);
        let mut trail = ServerTrail::default();
        let mut list = requests(&[0, 1, 3]);

        let path = resolver
            .resolve(&mut s.tree, &trail, &list)
            .unwrap()
            .unwrap();
        resolver.apply(&mut s.tree, &path, &mut trail, &mut list);

        assert!(list.iter().all(|r| r.lifecycle() == Lifecycle::Serviced));
        assert!(s.tree.leaves().all(|n| !n.request().unwrap().is_pending()));

        // nothing left to decide on
        fill(&mut s.tree, &[s.top]);
        assert!(check_saturation(&s.tree, trail.current(), &list).is_none());
    }
}
