//! Experience thresholds and level-ups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::character::Character;
use crate::constants::{LEVEL_CAP, XP_PER_LEVEL};
use crate::error::GameError;
use crate::numbers::u64_to_i64_saturating;

/// Level cap and threshold slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRules {
    pub level_cap: u32,
    pub xp_per_level: u32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            level_cap: LEVEL_CAP,
            xp_per_level: XP_PER_LEVEL,
        }
    }
}

impl ProgressionRules {
    /// Experience required to leave `level`.
    #[must_use]
    pub fn threshold(&self, level: u32) -> u64 {
        u64::from(level) * u64::from(self.xp_per_level)
    }

    #[must_use]
    pub const fn is_capped(&self, level: u32) -> bool {
        level >= self.level_cap
    }
}

/// The stat a level-up improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatChoice {
    Health,
    Attack,
    Defense,
}

impl StatChoice {
    pub const ALL: [Self; 3] = [Self::Health, Self::Attack, Self::Defense];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Attack => "attack",
            Self::Defense => "defense",
        }
    }
}

impl fmt::Display for StatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StatChoice {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" | "hp" | "max_hp" | "max_health" => Ok(Self::Health),
            "attack" | "atk" => Ok(Self::Attack),
            "defense" | "def" => Ok(Self::Defense),
            other => Err(GameError::InvalidArgument(format!(
                "unrecognized stat `{other}` (expected health, attack or defense)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub ready: bool,
    /// Negative once the threshold has been passed; zero at the level cap.
    pub experience_needed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub leveled: bool,
    pub level: u32,
}

/// Numbers a status display needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub experience: u64,
    pub experience_needed: i64,
    /// `None` at the level cap.
    pub next_threshold: Option<u64>,
    pub capped: bool,
}

#[must_use]
pub fn readiness(level: u32, experience: u64, rules: &ProgressionRules) -> Readiness {
    if rules.is_capped(level) {
        return Readiness {
            ready: false,
            experience_needed: 0,
        };
    }
    let threshold = rules.threshold(level);
    Readiness {
        ready: experience >= threshold,
        experience_needed: u64_to_i64_saturating(threshold)
            .saturating_sub(u64_to_i64_saturating(experience)),
    }
}

#[must_use]
pub fn progress(character: &Character, rules: &ProgressionRules) -> Progress {
    let capped = rules.is_capped(character.level);
    let status = readiness(character.level, character.experience, rules);
    Progress {
        level: character.level,
        experience: character.experience,
        experience_needed: status.experience_needed,
        next_threshold: (!capped).then(|| rules.threshold(character.level)),
        capped,
    }
}

/// Raise `character` one level if it has enough experience.
///
/// The chosen stat gains one point (health raises both maximum and current
/// health) and health is refilled. Not being ready is a no-op.
pub fn level_up(character: &mut Character, stat: StatChoice, rules: &ProgressionRules) -> LevelUp {
    if !readiness(character.level, character.experience, rules).ready {
        return LevelUp {
            leveled: false,
            level: character.level,
        };
    }

    character.level += 1;
    let stats = &mut character.stats;
    match stat {
        StatChoice::Health => {
            stats.max_health = stats.max_health.saturating_add(1);
            stats.health = stats.health.saturating_add(1);
        }
        StatChoice::Attack => stats.attack = stats.attack.saturating_add(1),
        StatChoice::Defense => stats.defense = stats.defense.saturating_add(1),
    }
    stats.restore();
    log::debug!(
        "user {} reached level {} (+1 {stat})",
        character.user_id,
        character.level
    );

    LevelUp {
        leveled: true,
        level: character.level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartingStats;

    fn hero(level: u32, experience: u64) -> Character {
        let mut character = Character::new("42", "Ayla", &StartingStats::default());
        character.level = level;
        character.experience = experience;
        character
    }

    #[test]
    fn threshold_is_level_times_ten() {
        let rules = ProgressionRules::default();
        assert_eq!(rules.threshold(1), 10);
        assert_eq!(rules.threshold(37), 370);
    }

    #[test]
    fn readiness_reports_remaining_experience() {
        let rules = ProgressionRules::default();
        assert_eq!(
            readiness(1, 4, &rules),
            Readiness {
                ready: false,
                experience_needed: 6
            }
        );
        assert_eq!(
            readiness(1, 15, &rules),
            Readiness {
                ready: true,
                experience_needed: -5
            }
        );
    }

    #[test]
    fn readiness_is_monotonic_in_experience() {
        let rules = ProgressionRules::default();
        for level in [1, 2, 10, 500] {
            let mut seen_ready = false;
            for xp in 0..(u64::from(level) * 20) {
                let ready = readiness(level, xp, &rules).ready;
                assert!(!seen_ready || ready, "level {level} xp {xp} regressed");
                seen_ready |= ready;
            }
            assert!(seen_ready);
        }
    }

    #[test]
    fn capped_level_is_never_ready() {
        let rules = ProgressionRules::default();
        assert_eq!(
            readiness(LEVEL_CAP, u64::MAX, &rules),
            Readiness {
                ready: false,
                experience_needed: 0
            }
        );
        let character = hero(LEVEL_CAP, 123);
        let status = progress(&character, &rules);
        assert!(status.capped);
        assert_eq!(status.next_threshold, None);
    }

    #[test]
    fn level_up_without_experience_is_noop() {
        let rules = ProgressionRules::default();
        let mut character = hero(1, 9);
        character.stats.health = 4;
        let before = character.clone();
        let result = level_up(&mut character, StatChoice::Attack, &rules);
        assert_eq!(
            result,
            LevelUp {
                leveled: false,
                level: 1
            }
        );
        assert_eq!(character, before);
    }

    #[test]
    fn level_up_raises_stat_and_refills_health() {
        let rules = ProgressionRules::default();
        let mut character = hero(1, 10);
        character.stats.health = 3;
        let result = level_up(&mut character, StatChoice::Health, &rules);
        assert_eq!(
            result,
            LevelUp {
                leveled: true,
                level: 2
            }
        );
        assert_eq!(character.stats.max_health, 11);
        assert_eq!(character.stats.health, 11);

        let mut character = hero(3, 30);
        character.stats.health = 1;
        level_up(&mut character, StatChoice::Defense, &rules);
        assert_eq!(character.level, 4);
        assert_eq!(character.stats.defense, 2);
        assert_eq!(character.stats.health, character.stats.max_health);
    }

    #[test]
    fn stat_choice_parses_known_names_only() {
        assert_eq!("HP".parse::<StatChoice>().unwrap(), StatChoice::Health);
        assert_eq!(" attack ".parse::<StatChoice>().unwrap(), StatChoice::Attack);
        assert_eq!("Defense".parse::<StatChoice>().unwrap(), StatChoice::Defense);
        let err = "luck".parse::<StatChoice>().unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
