use crate::scheduler::Millis;

/// Identifier for a spawned target; never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Lifecycle of a single target.
///
/// The only legal transitions are `Pending -> Hit` (tap), `Pending -> Removed`
/// (expiry) and `Hit -> Removed` (end of the feedback window). A hit target
/// can therefore never be expired into a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Pending,
    Hit,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    /// Top-left corner in arena pixels
    pub x: f64,
    pub y: f64,
    /// Diameter in arena pixels
    pub size: f64,
    pub spawned_at: Millis,
    state: TargetState,
}

impl Target {
    pub fn new(id: TargetId, x: f64, y: f64, size: f64, spawned_at: Millis) -> Self {
        Self {
            id,
            x,
            y,
            size,
            spawned_at,
            state: TargetState::Pending,
        }
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn is_hit(&self) -> bool {
        self.state == TargetState::Hit
    }

    /// Pending -> Hit. Returns false for any other starting state.
    pub fn mark_hit(&mut self) -> bool {
        self.transition(TargetState::Pending, TargetState::Hit)
    }

    /// Pending -> Removed. A target that was hit first stays untouched.
    pub fn expire(&mut self) -> bool {
        self.transition(TargetState::Pending, TargetState::Removed)
    }

    /// Hit -> Removed once the feedback window is over
    pub fn retire(&mut self) -> bool {
        self.transition(TargetState::Hit, TargetState::Removed)
    }

    fn transition(&mut self, from: TargetState, to: TargetState) -> bool {
        if self.state == from {
            self.state = to;
            true
        } else {
            false
        }
    }

    /// Whether an arena point lies inside the target's circle
    pub fn contains(&self, px: f64, py: f64) -> bool {
        circle_contains(self.x, self.y, self.size, px, py)
    }
}

/// Point-in-circle test for a circle given by its bounding box corner and diameter
pub fn circle_contains(x: f64, y: f64, size: f64, px: f64, py: f64) -> bool {
    let r = size / 2.0;
    let dx = px - (x + r);
    let dy = py - (y + r);
    dx * dx + dy * dy <= r * r
}
