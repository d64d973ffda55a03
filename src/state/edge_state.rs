#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EdgeState {
    #[default]
    Saturating,
    /// Marked for the pending service; accumulates nothing until applied.
    Servicing,
}

impl EdgeState {
    pub fn is_servicing(self) -> bool {
        self == EdgeState::Servicing
    }
}
