use crate::state::edge_state::EdgeState;
use crate::tree::node::{NodeId, NodeKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Edge identity across rebuilds: the identities of its two endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from: NodeKey,
    pub to: NodeKey,
}

#[derive(Clone, Debug)]
pub struct Edge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    /// radius of the child cluster, > 0.0
    length: f64,
    /// saturation, [0.0, length]
    value: f64,
    state: EdgeState,
}

impl Edge {
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, length: f64) -> Self {
        Self {
            id,
            from,
            to,
            length,
            value: 0.0,
            state: EdgeState::Saturating,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    pub fn capacity(&self) -> f64 {
        (self.length - self.value).max(0.0)
    }

    pub fn is_saturated(&self) -> bool {
        self.value >= self.length
    }

    /// Takes as much of `amount` as fits and returns the overflow.
    pub fn absorb(&mut self, amount: f64) -> f64 {
        let capacity = self.capacity();
        if amount < capacity {
            self.value += amount;
            return 0.0;
        }
        // snap to the length so saturation is exact
        self.value = self.length;
        amount - capacity
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value.clamp(0.0, self.length.max(0.0));
    }

    pub fn set_state(&mut self, state: EdgeState) {
        self.state = state;
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.state = EdgeState::Saturating;
    }
}
