/// One hit: when it happened in the round and how long it took
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactionPoint {
    /// Seconds since the round started
    pub t: f64,
    pub reaction_ms: f64,
}

impl ReactionPoint {
    pub fn new(t: f64, reaction_ms: f64) -> Self {
        Self { t, reaction_ms }
    }
}

impl From<ReactionPoint> for (f64, f64) {
    fn from(p: ReactionPoint) -> Self {
        (p.t, p.reaction_ms)
    }
}
