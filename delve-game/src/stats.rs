//! Combat stat blocks and the randomized balance generator for enemy species.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::constants::{
    ATTACK_CEIL_PER_LEVEL, ATTACK_FLOOR_PER_LEVEL, DEFENSE_CEIL_PER_LEVEL,
    DEFENSE_FLOOR_PER_LEVEL, GOLD_CEIL_PER_LEVEL, HEALTH_CEIL_PER_LEVEL, HEALTH_FLOOR_PER_LEVEL,
};
use crate::error::ConfigError;
use crate::numbers::{narrow_u32, round_half_even_to_u64, u64_to_f64};

/// Health, attack and defense shared by every combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
}

impl CombatStats {
    /// Stat block at full health.
    #[must_use]
    pub const fn new(max_health: u32, attack: u32, defense: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            attack,
            defense,
        }
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Remove up to `amount` health, never going below zero. Returns the damage applied.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.health);
        self.health -= applied;
        applied
    }

    pub fn restore(&mut self) {
        self.health = self.max_health;
    }

    pub fn clamp(&mut self) {
        self.health = self.health.min(self.max_health);
    }
}

/// A species' rolled balance numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub stats: CombatStats,
    pub experience_reward: u32,
    pub gold_reward: u32,
}

/// Inclusive draw ranges for a `(min_level, bias)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRanges {
    pub health: RangeInclusive<u32>,
    pub attack: RangeInclusive<u32>,
    pub defense: RangeInclusive<u32>,
    pub gold: RangeInclusive<u32>,
}

/// Compute the draw ranges for health, attack, defense and gold.
///
/// # Errors
///
/// Returns [`ConfigError::NonPositiveParameter`] when either parameter is zero
/// and [`ConfigError::Overflow`] when a bound does not fit in `u32`.
pub fn stat_ranges(min_level: u32, bias: u32) -> Result<StatRanges, ConfigError> {
    if min_level == 0 || bias == 0 {
        return Err(ConfigError::NonPositiveParameter { min_level, bias });
    }
    let level = u64::from(min_level);
    let bias_wide = u64::from(bias);
    let bound = |field: &'static str, value: Option<u64>| {
        value
            .and_then(narrow_u32)
            .ok_or(ConfigError::Overflow {
                field,
                min_level,
                bias,
            })
    };

    Ok(StatRanges {
        health: bound("health", level.checked_mul(HEALTH_FLOOR_PER_LEVEL))?
            ..=bound(
                "health",
                level
                    .checked_mul(HEALTH_CEIL_PER_LEVEL)
                    .and_then(|v| v.checked_mul(bias_wide)),
            )?,
        attack: bound("attack", level.checked_mul(ATTACK_FLOOR_PER_LEVEL))?
            ..=bound(
                "attack",
                level
                    .checked_mul(ATTACK_CEIL_PER_LEVEL)
                    .and_then(|v| v.checked_mul(bias_wide)),
            )?,
        defense: bound("defense", level.checked_mul(DEFENSE_FLOOR_PER_LEVEL))?
            ..=bound(
                "defense",
                level
                    .checked_mul(DEFENSE_CEIL_PER_LEVEL)
                    .and_then(|v| v.checked_mul(bias_wide)),
            )?,
        gold: min_level
            ..=bound(
                "gold",
                level
                    .checked_mul(GOLD_CEIL_PER_LEVEL)
                    .and_then(|v| v.checked_add(bias_wide)),
            )?,
    })
}

/// Experience reward range for a rolled stat total.
///
/// Lower bound is `round(total / (2 * min_level))`, upper bound is
/// `round(total * bias / min_level)`.
///
/// # Errors
///
/// Same conditions as [`stat_ranges`].
pub fn experience_range(
    min_level: u32,
    bias: u32,
    stat_total: u64,
) -> Result<RangeInclusive<u32>, ConfigError> {
    if min_level == 0 || bias == 0 {
        return Err(ConfigError::NonPositiveParameter { min_level, bias });
    }
    let overflow = ConfigError::Overflow {
        field: "experience",
        min_level,
        bias,
    };
    let total = u64_to_f64(stat_total);
    let level = f64::from(min_level);
    let low = round_half_even_to_u64(total / (level * 2.0));
    let high = round_half_even_to_u64(total * f64::from(bias) / level);
    let low = narrow_u32(low).ok_or_else(|| overflow.clone())?;
    let high = narrow_u32(high).ok_or(overflow)?;
    Ok(low..=high)
}

/// Roll a full set of balance numbers for a species.
///
/// Each value is drawn independently and uniformly from its inclusive range.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the parameters are not positive or a bound overflows.
pub fn generate<R: Rng + ?Sized>(
    min_level: u32,
    bias: u32,
    rng: &mut R,
) -> Result<SpeciesStats, ConfigError> {
    let ranges = stat_ranges(min_level, bias)?;
    let health = rng.gen_range(ranges.health);
    let attack = rng.gen_range(ranges.attack);
    let defense = rng.gen_range(ranges.defense);
    let total = u64::from(health) + u64::from(attack) + u64::from(defense);
    let experience_reward = rng.gen_range(experience_range(min_level, bias, total)?);
    let gold_reward = rng.gen_range(ranges.gold);

    Ok(SpeciesStats {
        stats: CombatStats::new(health, attack, defense),
        experience_reward,
        gold_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn damage_is_clamped_at_zero() {
        let mut stats = CombatStats::new(5, 1, 1);
        assert_eq!(stats.take_damage(3), 3);
        assert_eq!(stats.health, 2);
        assert_eq!(stats.take_damage(10), 2);
        assert_eq!(stats.health, 0);
        assert!(!stats.is_alive());
        stats.restore();
        assert_eq!(stats.health, 5);
    }

    #[test]
    fn ranges_follow_level_and_bias() {
        let ranges = stat_ranges(3, 2).unwrap();
        assert_eq!(ranges.health, 30..=120);
        assert_eq!(ranges.attack, 6..=24);
        assert_eq!(ranges.defense, 3..=12);
        assert_eq!(ranges.gold, 3..=32);
    }

    #[test]
    fn zero_parameters_are_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(
            generate(0, 1, &mut rng),
            Err(ConfigError::NonPositiveParameter {
                min_level: 0,
                bias: 1
            })
        );
        assert!(matches!(
            stat_ranges(4, 0),
            Err(ConfigError::NonPositiveParameter { .. })
        ));
    }

    #[test]
    fn huge_parameters_report_overflow() {
        let err = stat_ranges(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, ConfigError::Overflow { .. }));
    }

    #[test]
    fn experience_range_uses_half_even_rounding() {
        // 45 / 2 = 22.5 rounds to 22; 45 * 1 / 1 = 45.
        assert_eq!(experience_range(1, 1, 45).unwrap(), 22..=45);
        // 21 / 2 = 10.5 rounds to 10.
        assert_eq!(experience_range(1, 1, 21).unwrap(), 10..=21);
    }

    #[test]
    fn generated_values_stay_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x00C0_FFEE);
        for (min_level, bias) in [(1, 1), (3, 2), (5, 3), (10, 5), (25, 10), (80, 40)] {
            let ranges = stat_ranges(min_level, bias).unwrap();
            for _ in 0..200 {
                let rolled = generate(min_level, bias, &mut rng).unwrap();
                let stats = rolled.stats;
                assert!(ranges.health.contains(&stats.health));
                assert_eq!(stats.health, stats.max_health);
                assert!(ranges.attack.contains(&stats.attack));
                assert!(ranges.defense.contains(&stats.defense));
                assert!(ranges.gold.contains(&rolled.gold_reward));

                let total =
                    u64::from(stats.health) + u64::from(stats.attack) + u64::from(stats.defense);
                let xp = experience_range(min_level, bias, total).unwrap();
                assert!(xp.start() <= xp.end());
                assert!(xp.contains(&rolled.experience_reward));
            }
        }
    }

    #[test]
    fn same_seed_rolls_same_stats() {
        let a = generate(10, 5, &mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let b = generate(10, 5, &mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }
}
