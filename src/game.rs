//! Round lifecycle, target spawning and scoring.
//!
//! [`Game`] is the only owner of round state and the live target set. Every
//! timer is an entry in its [`Scheduler`]; when one fires it calls one of the
//! transition operations below, which re-check their own preconditions so a
//! callback that outlived its round does nothing.

use std::sync::mpsc::{self, Receiver, Sender};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::difficulty::Difficulty;
use crate::scheduler::{Millis, Scheduler};
use crate::session::RoundState;
use crate::target::{Target, TargetId};
use crate::time_series::ReactionPoint;

/// Round clock period
pub const CLOCK_INTERVAL_MS: Millis = 1000;
/// How long a hit target stays on screen before it is removed
pub const HIT_FEEDBACK_MS: Millis = 200;

/// Playable area in arena pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 320.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A tap from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tap {
    /// Tap already resolved to a target
    Target(TargetId),
    /// Tap somewhere in the arena
    At(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    ClockTick,
    Spawn,
    Expire(TargetId),
    Remove(TargetId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetView {
    pub id: TargetId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub hit: bool,
}

impl TargetView {
    pub fn contains(&self, p: Point) -> bool {
        crate::target::circle_contains(self.x, self.y, self.size, p.x, p.y)
    }
}

/// Observable state published after every mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub score: u32,
    pub misses: u32,
    pub time_left: u32,
    pub active: bool,
    pub difficulty: Difficulty,
    pub round: u32,
    pub accuracy: Option<f64>,
    pub avg_reaction_ms: Option<f64>,
    /// Standard deviation of the round's reaction times
    pub reaction_spread_ms: Option<f64>,
    pub live_targets: Vec<TargetView>,
}

#[derive(Debug)]
pub struct Game<R: Rng = StdRng> {
    round: RoundState,
    arena: Arena,
    targets: Vec<Target>,
    scheduler: Scheduler<Timer>,
    next_target_id: u64,
    spawned: u32,
    round_started_at: Millis,
    reactions: Vec<ReactionPoint>,
    rng: R,
    subscribers: Vec<Sender<Snapshot>>,
}

impl Game<StdRng> {
    /// Deterministic when a seed is given, entropy-seeded otherwise
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> Game<R> {
    pub fn new(rng: R) -> Self {
        Self {
            round: RoundState::default(),
            arena: Arena::default(),
            targets: Vec::new(),
            scheduler: Scheduler::new(),
            next_target_id: 0,
            spawned: 0,
            round_started_at: 0,
            reactions: Vec::new(),
            rng,
            subscribers: Vec::new(),
        }
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn is_active(&self) -> bool {
        self.round.active
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    /// Current virtual time in ms
    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Targets spawned in the current (or last) round
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Reaction time of every hit in the current (or last) round
    pub fn reactions(&self) -> &[ReactionPoint] {
        &self.reactions
    }

    /// Timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// New spawns use the new bounds; live targets stay where they are.
    pub fn set_arena(&mut self, arena: Arena) {
        self.arena = arena;
    }

    /// Receive a [`Snapshot`] after every state change
    pub fn subscribe(&mut self) -> Receiver<Snapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn snapshot(&self) -> Snapshot {
        let reaction_times: Vec<f64> = self.reactions.iter().map(|p| p.reaction_ms).collect();
        Snapshot {
            score: self.round.score,
            misses: self.round.misses,
            time_left: self.round.time_left,
            active: self.round.active,
            difficulty: self.round.difficulty,
            round: self.round.round,
            accuracy: self.round.accuracy(),
            avg_reaction_ms: crate::util::mean(&reaction_times),
            reaction_spread_ms: crate::util::std_dev(&reaction_times),
            live_targets: self
                .targets
                .iter()
                .map(|t| TargetView {
                    id: t.id,
                    x: t.x,
                    y: t.y,
                    size: t.size,
                    hit: t.is_hit(),
                })
                .collect(),
        }
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    /// Idle -> Active. Returns false if a round is already running.
    pub fn start_round(&mut self, difficulty: Difficulty) -> bool {
        if self.round.active {
            log::trace!("start_round ignored: round already active");
            return false;
        }
        let profile = difficulty.profile();

        self.scheduler.clear();
        self.targets.clear();
        self.reactions.clear();
        self.spawned = 0;
        self.round.begin(difficulty);
        self.round_started_at = self.scheduler.now();

        self.scheduler
            .schedule_after(CLOCK_INTERVAL_MS, Timer::ClockTick);
        self.scheduler
            .schedule_after(profile.spawn_interval_ms, Timer::Spawn);

        log::info!(
            "round {} started at {}ms (difficulty {})",
            self.round.round,
            self.round_started_at,
            difficulty
        );
        self.publish();
        true
    }

    /// Round clock: one second elapsed
    pub fn tick(&mut self) {
        if !self.round.active {
            return;
        }
        self.round.time_left = self.round.time_left.saturating_sub(1);
        if self.round.time_left == 0 {
            self.end_round();
            return;
        }
        self.scheduler
            .schedule_after(CLOCK_INTERVAL_MS, Timer::ClockTick);
        self.publish();
    }

    /// Active -> Idle. Cancels every pending timer of the round.
    pub fn end_round(&mut self) {
        if !self.round.active {
            return;
        }
        self.round.active = false;
        self.scheduler.clear();
        self.targets.clear();
        log::info!(
            "round {} ended: score {} misses {} ({} targets spawned)",
            self.round.round,
            self.round.score,
            self.round.misses,
            self.spawned
        );
        self.publish();
    }

    /// Spawner: place a new target and reschedule the next spawn
    pub fn spawn_target(&mut self) {
        if !self.round.active {
            return;
        }
        let profile = self.round.difficulty.profile();
        let size = profile.target_size;
        let x = self.random_offset(self.arena.width - size);
        let y = self.random_offset(self.arena.height - size);

        let id = TargetId(self.next_target_id);
        self.next_target_id += 1;
        self.spawned += 1;
        self.targets
            .push(Target::new(id, x, y, size, self.scheduler.now()));

        self.scheduler
            .schedule_after(profile.target_lifetime_ms, Timer::Expire(id));
        self.scheduler
            .schedule_after(profile.spawn_interval_ms, Timer::Spawn);

        log::debug!("spawned target {} at ({:.0}, {:.0})", id.0, x, y);
        self.publish();
    }

    fn random_offset(&mut self, max: f64) -> f64 {
        if max > 0.0 {
            self.rng.gen_range(0.0..=max)
        } else {
            0.0
        }
    }

    /// Lifetime over: a still-pending target becomes a miss
    pub fn expire_target(&mut self, id: TargetId) {
        if !self.round.active {
            log::trace!("expiry for target {} after round end", id.0);
            return;
        }
        let Some(idx) = self.position(id) else {
            return;
        };
        if self.targets[idx].expire() {
            self.targets.remove(idx);
            self.round.misses += 1;
            log::debug!("target {} expired", id.0);
            self.publish();
        }
    }

    /// Pending -> Hit, scoring a point. Duplicate taps are ignored.
    pub fn hit_target(&mut self, id: TargetId) {
        if !self.round.active {
            return;
        }
        let Some(idx) = self.position(id) else {
            return;
        };
        let now = self.scheduler.now();
        let target = &mut self.targets[idx];
        if !target.mark_hit() {
            log::trace!("duplicate tap on target {}", id.0);
            return;
        }
        let reaction_ms = now.saturating_sub(target.spawned_at) as f64;
        let t = now.saturating_sub(self.round_started_at) as f64 / 1000.0;
        self.reactions.push(ReactionPoint::new(t, reaction_ms));
        self.round.score += 1;
        self.scheduler
            .schedule_after(HIT_FEEDBACK_MS, Timer::Remove(id));
        log::debug!("target {} hit after {}ms", id.0, reaction_ms);
        self.publish();
    }

    /// Feedback window over: drop a hit target without touching the score
    fn remove_hit_target(&mut self, id: TargetId) {
        if !self.round.active {
            return;
        }
        if let Some(idx) = self.position(id) {
            if self.targets[idx].retire() {
                self.targets.remove(idx);
                self.publish();
            }
        }
    }

    /// Tap on empty arena
    pub fn register_miss(&mut self) {
        if !self.round.active {
            return;
        }
        self.round.misses += 1;
        self.round.background_taps += 1;
        self.publish();
    }

    /// Route a tap to the topmost target under it, or count a miss
    pub fn on_tap(&mut self, tap: Tap) {
        if !self.round.active {
            return;
        }
        match tap {
            Tap::Target(id) => self.hit_target(id),
            Tap::At(p) => match self.target_at(p) {
                Some(id) => self.hit_target(id),
                None => self.register_miss(),
            },
        }
    }

    /// Topmost live target containing `p`; later spawns are drawn on top
    pub fn target_at(&self, p: Point) -> Option<TargetId> {
        self.targets
            .iter()
            .rev()
            .find(|t| t.contains(p.x, p.y))
            .map(|t| t.id)
    }

    /// Advance virtual time by `elapsed` ms
    pub fn advance(&mut self, elapsed: Millis) {
        let until = self.scheduler.now().saturating_add(elapsed);
        self.advance_to(until);
    }

    /// Fire every timer due up to `now`, each at its own due time
    pub fn advance_to(&mut self, now: Millis) {
        while let Some((_, timer)) = self.scheduler.pop_due(now) {
            self.fire(timer);
        }
        self.scheduler.set_now(now);
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::ClockTick => self.tick(),
            Timer::Spawn => self.spawn_target(),
            Timer::Expire(id) => self.expire_target(id),
            Timer::Remove(id) => self.remove_hit_target(id),
        }
    }

    fn position(&self, id: TargetId) -> Option<usize> {
        self.targets.iter().position(|t| t.id == id)
    }
}
