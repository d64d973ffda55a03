use crate::error::{OsdError, OsdResult};
use crate::simulation::penalty::Penalty;
use crate::tree::edge::EdgeId;
use crate::tree::node::NodeId;
use crate::tree::tree::Tree;
use std::time::Duration;
use tracing::trace;

/// Turns elapsed time into edge saturation.
///
/// Each pending leaf feeds the penalty accrued over the tick into its
/// incoming edge. An edge holds at most its length; the excess climbs toward
/// the root and whatever reaches past the top edge is dropped.
#[derive(Clone, Debug, Default)]
pub struct SaturationEngine {
    default_penalty: Penalty,
}

impl SaturationEngine {
    pub fn new(default_penalty: Penalty) -> Self {
        Self { default_penalty }
    }

    pub fn advance(&self, tree: &mut Tree, dt: Duration) -> OsdResult<()> {
        self.advance_with(tree, dt, &self.default_penalty)
    }

    /// [`advance`](Self::advance) with a one-off default for requests that
    /// carry no penalty of their own.
    pub fn advance_with(&self, tree: &mut Tree, dt: Duration, default_penalty: &Penalty) -> OsdResult<()> {
        if tree.node_count() < 2 {
            return Ok(());
        }
        let leaves: Vec<NodeId> = tree
            .leaves()
            .filter(|n| n.request().is_some_and(|r| r.is_pending()))
            .map(|n| n.id())
            .collect();
        let absorbed = inject(tree, &leaves, dt.as_secs_f64(), default_penalty, None)?;
        trace!(leaves = leaves.len(), absorbed, "advanced tree");
        Ok(())
    }

    /// Same as [`advance`](Self::advance) but limited to the leaves below
    /// `top`; nothing spills past `top`. Returns the penalty the edges from
    /// the leaves up to `top` absorbed, so 0 once every such path is full.
    pub fn advance_subtree(&self, tree: &mut Tree, top: EdgeId, dt: Duration) -> OsdResult<f64> {
        let leaves: Vec<NodeId> = tree
            .subtree_edges(top)
            .into_iter()
            .map(|e| tree.edge_by_id(e).to())
            .filter(|n| {
                tree.node_by_id(*n)
                    .request()
                    .is_some_and(|r| r.is_pending())
            })
            .collect();
        inject(tree, &leaves, dt.as_secs_f64(), &self.default_penalty, Some(top))
    }
}

fn inject(
    tree: &mut Tree,
    leaves: &[NodeId],
    dt: f64,
    default_penalty: &Penalty,
    ceiling: Option<EdgeId>,
) -> OsdResult<f64> {
    let entries = leaves
        .iter()
        .map(|id| match tree.incoming(*id) {
            Some(edge) => Ok((*id, edge)),
            None => Err(OsdError::MalformedTree {
                node: tree.node_by_id(*id).key().clone(),
            }),
        })
        .collect::<OsdResult<Vec<(NodeId, EdgeId)>>>()?;

    let mut total = 0.0;
    for (leaf, edge) in entries {
        let injected = match tree.node_mut(leaf).request_mut() {
            Some(request) => request.consume(dt, default_penalty),
            None => continue,
        };
        let leftover = saturate_edge(tree, edge, injected, ceiling);
        total += injected - leftover;
    }
    Ok(total)
}

/// Pushes `amount` into `edge`, forwarding overflow to parent edges. Edges
/// that are already saturated or marked for service pass everything through.
/// Stops after `ceiling` when given. Returns what was left over.
pub fn saturate_edge(tree: &mut Tree, edge: EdgeId, amount: f64, ceiling: Option<EdgeId>) -> f64 {
    let mut current = edge;
    let mut remaining = amount;
    loop {
        if remaining <= 0.0 {
            return 0.0;
        }
        let e = tree.edge_mut(current);
        if !e.is_saturated() && !e.state().is_servicing() {
            remaining = e.absorb(remaining);
        }
        if ceiling == Some(current) {
            return remaining;
        }
        match tree.parent_edge(current) {
            Some(parent) => current = parent,
            None => return remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::penalty::Term;
    use crate::state::edge_state::EdgeState;
    use crate::state::request::{Lifecycle, Point, Request, RequestId};
    use crate::tree::fixtures::{ROOT, TreeFixture};
    use crate::tree::node::{Node, NodeKey};
    use crate::tree::tree::MetricInfo;
    use approx::assert_relative_eq;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_leaf_edge_saturates_and_overflows() {
        let mut f = TreeFixture::new();
        let (c, top) = f.cluster(ROOT, 4.0);
        let (_, leaf) = f.leaf(c, 2.0, 0);
        let mut tree = f.build();
        let engine = SaturationEngine::default();

        engine.advance(&mut tree, secs(1.5)).unwrap();
        assert_relative_eq!(1.5, tree.edge_by_id(leaf).value());
        assert!(!tree.edge_by_id(leaf).is_saturated());
        assert_relative_eq!(0.0, tree.edge_by_id(top).value());

        engine.advance(&mut tree, secs(1.0)).unwrap();
        assert_relative_eq!(2.0, tree.edge_by_id(leaf).value());
        assert!(tree.edge_by_id(leaf).is_saturated());
        assert_relative_eq!(0.5, tree.edge_by_id(top).value());
    }

    #[test]
    fn test_milliseconds_are_converted_to_seconds() {
        let mut f = TreeFixture::new();
        let (_, leaf) = f.leaf(ROOT, 2.0, 0);
        let mut tree = f.build();

        SaturationEngine::default()
            .advance(&mut tree, Duration::from_millis(250))
            .unwrap();
        assert_relative_eq!(0.25, tree.edge_by_id(leaf).value());
    }

    #[test]
    fn test_overflow_past_root_is_dropped() {
        let mut f = TreeFixture::new();
        let (_, leaf) = f.leaf(ROOT, 1.0, 0);
        let mut tree = f.build();

        SaturationEngine::default().advance(&mut tree, secs(5.0)).unwrap();
        assert_relative_eq!(1.0, tree.edge_by_id(leaf).value());
    }

    #[test]
    fn test_noop_below_two_nodes() {
        let mut tree = Tree::new(
            vec![Node::new(ROOT, NodeKey::Root, Point::ORIGIN)],
            vec![],
            vec![],
            MetricInfo::default(),
        );
        assert!(SaturationEngine::default().advance(&mut tree, secs(1.0)).is_ok());
    }

    #[test]
    fn test_leaf_without_edge_is_fatal() {
        let mut tree = Tree::new(
            vec![
                Node::new(ROOT, NodeKey::Root, Point::ORIGIN),
                Node::leaf(NodeId(1), Request::new(RequestId(3), Point::ORIGIN)),
            ],
            vec![],
            vec![],
            MetricInfo::default(),
        );
        let err = SaturationEngine::default()
            .advance(&mut tree, secs(1.0))
            .unwrap_err();
        assert!(matches!(err, OsdError::MalformedTree { node: NodeKey::Request(RequestId(3)) }));
        // nothing was consumed before the failure surfaced
        assert_relative_eq!(0.0, tree.node_by_id(NodeId(1)).request().unwrap().elapsed());
    }

    #[test]
    fn test_serviced_leaves_are_skipped() {
        let mut f = TreeFixture::new();
        let mut done = Request::new(RequestId(0), Point::ORIGIN);
        done.set_lifecycle(Lifecycle::Serviced);
        let (_, a) = f.leaf_with(ROOT, 2.0, done);
        let (_, b) = f.leaf(ROOT, 2.0, 1);
        let mut tree = f.build();

        SaturationEngine::default().advance(&mut tree, secs(1.0)).unwrap();
        assert_relative_eq!(0.0, tree.edge_by_id(a).value());
        assert_relative_eq!(1.0, tree.edge_by_id(b).value());
    }

    #[test]
    fn test_servicing_edges_pass_through() {
        let mut f = TreeFixture::new();
        let (c, top) = f.cluster(ROOT, 4.0);
        let (_, leaf) = f.leaf(c, 2.0, 0);
        let mut tree = f.build();
        tree.edge_mut(leaf).set_state(EdgeState::Servicing);

        SaturationEngine::default().advance(&mut tree, secs(1.0)).unwrap();
        assert_relative_eq!(0.0, tree.edge_by_id(leaf).value());
        assert_relative_eq!(1.0, tree.edge_by_id(top).value());
    }

    #[test]
    fn test_request_penalty_overrides_default() {
        let mut f = TreeFixture::new();
        let quadratic = Penalty::Polynomial(vec![Term::new(1.0, 2)]);
        let (_, leaf) = f.leaf_with(
            ROOT,
            10.0,
            Request::new(RequestId(0), Point::ORIGIN).with_penalty(quadratic),
        );
        let mut tree = f.build();

        let engine = SaturationEngine::default();
        engine.advance(&mut tree, secs(1.0)).unwrap();
        engine.advance(&mut tree, secs(1.0)).unwrap();
        assert_relative_eq!(4.0, tree.edge_by_id(leaf).value());
    }

    #[test]
    fn test_default_penalty_applies_to_plain_requests() {
        let mut f = TreeFixture::new();
        let (_, leaf) = f.leaf(ROOT, 10.0, 0);
        let mut tree = f.build();

        let engine = SaturationEngine::new(Penalty::Polynomial(vec![Term::new(3.0, 1)]));
        engine.advance(&mut tree, secs(1.0)).unwrap();
        assert_relative_eq!(3.0, tree.edge_by_id(leaf).value());
    }

    #[test]
    fn test_advance_with_overrides_engine_default() {
        let mut f = TreeFixture::new();
        let (_, plain) = f.leaf(ROOT, 10.0, 0);
        let (_, own) = f.leaf_with(
            ROOT,
            10.0,
            Request::new(RequestId(1), Point::ORIGIN).with_penalty(Penalty::Identity),
        );
        let mut tree = f.build();

        let doubled = Penalty::Polynomial(vec![Term::new(2.0, 1)]);
        SaturationEngine::default()
            .advance_with(&mut tree, secs(1.0), &doubled)
            .unwrap();
        assert_relative_eq!(2.0, tree.edge_by_id(plain).value());
        assert_relative_eq!(1.0, tree.edge_by_id(own).value());
    }

    #[test]
    fn test_subtree_advance_stops_at_top_edge() {
        let mut f = TreeFixture::new();
        let (big, big_edge) = f.cluster(ROOT, 8.0);
        let (c, top) = f.cluster(big, 2.0);
        let (_, inner) = f.leaf(c, 1.0, 0);
        let (_, outside) = f.leaf(big, 4.0, 1);
        let mut tree = f.build();

        // 1 + 2 fits below the ceiling, the other 2 is dropped
        let absorbed = SaturationEngine::default()
            .advance_subtree(&mut tree, top, secs(5.0))
            .unwrap();
        assert_relative_eq!(3.0, absorbed);
        assert_relative_eq!(1.0, tree.edge_by_id(inner).value());
        assert_relative_eq!(2.0, tree.edge_by_id(top).value());
        assert_relative_eq!(0.0, tree.edge_by_id(big_edge).value());
        assert_relative_eq!(0.0, tree.edge_by_id(outside).value());
    }

    #[test]
    fn test_saturate_edge_reports_leftover() {
        let mut f = TreeFixture::new();
        let (c, top) = f.cluster(ROOT, 2.0);
        let (_, leaf) = f.leaf(c, 1.0, 0);
        let mut tree = f.build();

        assert_relative_eq!(0.0, saturate_edge(&mut tree, leaf, 2.0, None));
        assert_relative_eq!(1.0, tree.edge_by_id(top).value());
        assert_relative_eq!(1.5, saturate_edge(&mut tree, leaf, 2.5, None));
        assert_relative_eq!(2.0, tree.edge_by_id(top).value());
    }

    #[test]
    fn test_subtree_advance_absorbs_nothing_on_full_paths() {
        let mut f = TreeFixture::new();
        let (c, top) = f.cluster(ROOT, 4.0);
        let (n, leaf) = f.leaf(c, 2.0, 0);
        let mut tree = f.build();
        tree.edge_mut(top).set_value(4.0);
        tree.edge_mut(leaf).set_value(2.0);

        let absorbed = SaturationEngine::default()
            .advance_subtree(&mut tree, top, secs(1.0))
            .unwrap();
        assert_relative_eq!(0.0, absorbed);
        // the request still waited
        assert_relative_eq!(1.0, tree.node_by_id(n).request().unwrap().elapsed());
    }
}
