use crate::difficulty::Difficulty;

/// Fixed length of a round in seconds
pub const ROUND_SECS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub score: u32,
    pub misses: u32,
    pub time_left: u32,
    pub active: bool,
    pub difficulty: Difficulty,
    /// Number of rounds started so far, 0 before the first one
    pub round: u32,
    /// Background taps while active; misses minus these are expiries
    pub background_taps: u32,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            score: 0,
            misses: 0,
            time_left: ROUND_SECS,
            active: false,
            difficulty: Difficulty::default(),
            round: 0,
            background_taps: 0,
        }
    }
}

impl RoundState {
    /// Fresh state for the next round
    pub fn begin(&mut self, difficulty: Difficulty) {
        *self = Self {
            active: true,
            difficulty,
            round: self.round + 1,
            ..Self::default()
        };
    }

    pub fn accuracy(&self) -> Option<f64> {
        crate::util::percentage(self.score, self.score + self.misses)
    }
}
