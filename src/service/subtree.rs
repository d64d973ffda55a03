//! Subtree selections below a saturated edge.

use crate::tree::edge::EdgeId;
use crate::tree::tree::Tree;

/// The edge and all of its descendants.
pub fn relevant_subtree(tree: &Tree, edge: EdgeId) -> Vec<EdgeId> {
    tree.subtree_edges(edge)
}

/// The edge plus saturated descendants reachable without crossing an
/// unsaturated edge, restricted to `relevant`.
pub fn critical_subtree(tree: &Tree, edge: EdgeId, relevant: &[EdgeId]) -> Vec<EdgeId> {
    let mut critical = vec![edge];
    for child in tree.child_edges(edge) {
        if relevant.contains(child) && tree.edge_by_id(*child).is_saturated() {
            critical.extend(critical_subtree(tree, *child, relevant));
        }
    }
    critical
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyEdges {
    pub weight: f64,
    pub edges: Vec<EdgeId>,
}

/// Shallowest cut of the critical subtree whose lengths cover the weight
/// collected below it. An edge at least as long as its children's combined
/// weight replaces them.
pub fn key_edges(tree: &Tree, edge: EdgeId, critical: &[EdgeId]) -> KeyEdges {
    let mut weight = 0.0;
    let mut edges = Vec::new();
    for child in tree.child_edges(edge).iter().filter(|c| critical.contains(*c)) {
        let below = key_edges(tree, *child, critical);
        weight += below.weight;
        edges.extend(below.edges);
    }

    let length = tree.edge_by_id(edge).length();
    if length >= weight {
        KeyEdges {
            weight: length,
            edges: vec![edge],
        }
    } else {
        KeyEdges { weight, edges }
    }
}

/// Saturated weight hanging below `edge` in its critical subtree reaches the
/// edge's own length.
pub fn is_oversaturated(tree: &Tree, edge: EdgeId) -> bool {
    let relevant = relevant_subtree(tree, edge);
    let weight: f64 = critical_subtree(tree, edge, &relevant)
        .into_iter()
        .filter(|e| *e != edge)
        .map(|e| tree.edge_by_id(e))
        .filter(|e| e.is_saturated())
        .map(|e| e.value())
        .sum();
    weight >= tree.edge_by_id(edge).length()
}

pub fn sum_values(tree: &Tree, edges: &[EdgeId]) -> f64 {
    edges.iter().map(|e| tree.edge_by_id(*e).value()).sum()
}

pub fn sum_lengths(tree: &Tree, edges: &[EdgeId]) -> f64 {
    edges.iter().map(|e| tree.edge_by_id(*e).length()).sum()
}
