//! Time forwarding inside an overloaded subtree.
//!
//! While an edge below the forwarded one that still has a pending request
//! underneath is unsaturated, either the saturated weight below the edge
//! already reaches its length (the subtree is oversaturated and a set of
//! lower edges is pulled into the service), or the subtree is advanced on a
//! synthetic clock. Edges leading only to retired requests never fill, so
//! they do not keep the clock running.

use crate::config::ForwardingConfig;
use crate::error::OsdResult;
use crate::service::subtree::{is_oversaturated, relevant_subtree, sum_lengths, sum_values};
use crate::simulation::engine::SaturationEngine;
use crate::tree::edge::EdgeId;
use crate::tree::tree::Tree;
use tracing::{debug, warn};

/// G-sets are trimmed while their saturation exceeds this multiple of the
/// forwarded edge's length.
const G_SET_SLACK: f64 = 1.5;

/// Walks from the bottom of `edge` down to every leaf edge of `subtree`
/// and keeps the first edge on each walk that is not itself oversaturated.
/// Walks that meet only oversaturated edges contribute nothing. Edges come
/// out in leaf order and each appears once.
pub fn g_set(tree: &Tree, edge: EdgeId, subtree: &[EdgeId]) -> Vec<EdgeId> {
    let top = tree.edge_by_id(edge).to();
    let leaf_edges = subtree.iter().filter(|e| {
        let to = tree.edge_by_id(**e).to();
        !subtree.iter().any(|c| tree.edge_by_id(*c).from() == to)
    });

    let mut result = Vec::new();
    for leaf_edge in leaf_edges {
        let path = tree.path_between(top, tree.edge_by_id(*leaf_edge).to());
        if let Some(first) = path.into_iter().find(|e| !is_oversaturated(tree, *e)) {
            if !result.contains(&first) {
                result.push(first);
            }
        }
    }
    result
}

/// Drops edges from the back of `g_set` while its summed value exceeds
/// [`G_SET_SLACK`] times the length of `edge`.
pub fn trim_g_set(tree: &Tree, edge: EdgeId, mut g_set: Vec<EdgeId>) -> Vec<EdgeId> {
    let limit = G_SET_SLACK * tree.edge_by_id(edge).length();
    while sum_values(tree, &g_set) > limit {
        g_set.pop();
    }
    g_set
}

/// Shortest prefix of `g_set` whose lengths cover `edge`.
pub fn h_set(tree: &Tree, edge: EdgeId, g_set: &[EdgeId]) -> Vec<EdgeId> {
    let length = tree.edge_by_id(edge).length();
    let mut result = Vec::new();
    for e in g_set {
        result.push(*e);
        if sum_lengths(tree, &result) >= length {
            break;
        }
    }
    result
}

pub struct TimeForwarder<'a> {
    engine: &'a SaturationEngine,
    config: ForwardingConfig,
}

impl<'a> TimeForwarder<'a> {
    pub fn new(engine: &'a SaturationEngine, config: ForwardingConfig) -> Self {
        Self { engine, config }
    }

    /// Extra edges to service alongside `edge`. Mutates the subtree: the
    /// synthetic clock consumes request time exactly like a real tick.
    pub fn forward(&self, tree: &mut Tree, edge: EdgeId) -> OsdResult<Vec<EdgeId>> {
        let subtree = relevant_subtree(tree, edge);
        let live = live_edges(tree, &subtree);
        let mut steps = 0;

        while live.iter().any(|e| !tree.edge_by_id(*e).is_saturated()) {
            if is_oversaturated(tree, edge) {
                let g = trim_g_set(tree, edge, g_set(tree, edge, &subtree));
                let h = h_set(tree, edge, &g);

                let mut result = h.clone();
                for e in &h {
                    for extra in self.forward(tree, *e)? {
                        if !result.contains(&extra) {
                            result.push(extra);
                        }
                    }
                }
                debug!(edge = edge.index(), g = g.len(), h = h.len(), forwarded = result.len(), "oversaturated subtree");
                return Ok(result);
            }

            if steps >= self.config.max_steps {
                warn!(edge = edge.index(), steps, "time forwarding stopped at step limit");
                break;
            }
            let absorbed = self.engine.advance_subtree(tree, edge, self.config.increment)?;
            steps += 1;
            if absorbed <= 0.0 {
                debug!(edge = edge.index(), steps, "time forwarding made no progress");
                break;
            }
        }
        Ok(Vec::new())
    }
}

/// Edges of `subtree` with at least one pending request below them.
fn live_edges(tree: &Tree, subtree: &[EdgeId]) -> Vec<EdgeId> {
    subtree
        .iter()
        .copied()
        .filter(|e| {
            tree.subtree_edges(*e).into_iter().any(|d| {
                tree.node_by_id(tree.edge_by_id(d).to())
                    .request()
                    .is_some_and(|r| r.is_pending())
            })
        })
        .collect()
}
