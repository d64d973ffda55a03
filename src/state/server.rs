use crate::state::request::Point;
use crate::tree::node::NodeKey;

/// A place the server has stood, named by tree identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub key: NodeKey,
    pub point: Point,
}

impl Position {
    pub fn new(key: NodeKey, point: Point) -> Self {
        Self { key, point }
    }

    pub fn root() -> Self {
        Self::new(NodeKey::Root, Point::ORIGIN)
    }
}

/// Append-only movement history; the last entry is the current position.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerTrail {
    positions: Vec<Position>,
}

impl ServerTrail {
    pub fn new(start: Position) -> Self {
        Self {
            positions: vec![start],
        }
    }

    pub fn current(&self) -> &Position {
        // never empty: constructed with a start position and only appended to
        &self.positions[self.positions.len() - 1]
    }

    pub fn push(&mut self, position: Position) {
        self.positions.push(position);
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Total straight-line distance covered so far.
    pub fn distance_travelled(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|w| w[0].point.distance(&w[1].point))
            .sum()
    }
}

impl Default for ServerTrail {
    fn default() -> Self {
        Self::new(Position::root())
    }
}
