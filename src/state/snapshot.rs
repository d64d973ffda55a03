use crate::state::edge_state::EdgeState;
use crate::state::request::{Lifecycle, RequestId};
use crate::tree::edge::EdgeKey;
use crate::tree::tree::Tree;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
struct EdgeEntry {
    value: f64,
    state: EdgeState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct LeafEntry {
    elapsed: f64,
    lifecycle: Lifecycle,
}

/// Mutable tree state keyed by identity, so it survives a rebuild.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeSnapshot {
    edges: HashMap<EdgeKey, EdgeEntry>,
    leaves: HashMap<RequestId, LeafEntry>,
}

impl TreeSnapshot {
    pub fn capture(tree: &Tree) -> Self {
        let edges = tree
            .edges()
            .iter()
            .map(|e| {
                (
                    tree.edge_key(e.id()),
                    EdgeEntry {
                        value: e.value(),
                        state: e.state(),
                    },
                )
            })
            .collect();
        let leaves = tree
            .leaves()
            .filter_map(|n| n.request())
            .map(|r| {
                (
                    r.id(),
                    LeafEntry {
                        elapsed: r.elapsed(),
                        lifecycle: r.lifecycle(),
                    },
                )
            })
            .collect();
        Self { edges, leaves }
    }

    /// Copies matching entries onto `tree`. Edges and leaves that did not
    /// exist before keep their fresh state. Returns how many edges matched.
    pub fn restore(&self, tree: &mut Tree) -> usize {
        let mut matched = 0;
        for i in 0..tree.edge_count() {
            let id = tree.edges()[i].id();
            if let Some(entry) = self.edges.get(&tree.edge_key(id)) {
                let edge = tree.edge_mut(id);
                edge.set_value(entry.value);
                edge.set_state(entry.state);
                matched += 1;
            }
        }

        let leaf_ids: Vec<_> = tree.leaves().map(|n| n.id()).collect();
        for id in leaf_ids {
            let Some(request) = tree.node_mut(id).request_mut() else {
                continue;
            };
            if let Some(entry) = self.leaves.get(&request.id()) {
                request.set_elapsed(entry.elapsed);
                request.set_lifecycle(entry.lifecycle);
            }
        }
        matched
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }
}
