use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::scheduler::Millis;

/// Difficulty selected before a round starts
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Timing and sizing parameters for one difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// How long an untouched target stays before it counts as a miss
    pub target_lifetime_ms: Millis,
    /// Cadence of the spawner
    pub spawn_interval_ms: Millis,
    /// Target diameter in arena pixels
    pub target_size: f64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                target_lifetime_ms: 2000,
                spawn_interval_ms: 1500,
                target_size: 80.0,
            },
            Difficulty::Medium => DifficultyProfile {
                target_lifetime_ms: 1500,
                spawn_interval_ms: 1200,
                target_size: 60.0,
            },
            Difficulty::Hard => DifficultyProfile {
                target_lifetime_ms: 1000,
                spawn_interval_ms: 800,
                target_size: 40.0,
            },
        }
    }

    /// Next difficulty in selector order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_profile_matches_reference_timings() {
        let p = Difficulty::Medium.profile();
        assert_eq!(p.spawn_interval_ms, 1200);
        assert_eq!(p.target_lifetime_ms, 1500);
        assert_eq!(p.target_size, 60.0);
    }

    #[test]
    fn harder_profiles_are_faster_and_smaller() {
        let [easy, medium, hard] = Difficulty::ALL.map(Difficulty::profile);
        assert!(easy.spawn_interval_ms > medium.spawn_interval_ms);
        assert!(medium.spawn_interval_ms > hard.spawn_interval_ms);
        assert!(easy.target_lifetime_ms > hard.target_lifetime_ms);
        assert!(easy.target_size > hard.target_size);
    }

    #[test]
    fn cycling_wraps_in_both_directions() {
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.prev(), Difficulty::Hard);
        for d in Difficulty::ALL {
            assert_eq!(d.next().prev(), d);
        }
    }

    #[test]
    fn display_and_serde_use_lowercase_names() {
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert_eq!(
            serde_json::to_string(&Difficulty::Hard).unwrap(),
            "\"hard\""
        );
        let parsed: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Difficulty::Medium);
    }
}
