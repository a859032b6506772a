//! Single-exchange combat resolution.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFENSE_HIT_CAP, HIT_ROLL_CEILING};
use crate::stats::CombatStats;

/// Anything with a stat block that can trade blows.
pub trait Combatant {
    fn name(&self) -> &str;

    fn stats(&self) -> &CombatStats;

    fn stats_mut(&mut self) -> &mut CombatStats;

    fn attack(&self) -> u32 {
        self.stats().attack
    }

    fn defense(&self) -> u32 {
        self.stats().defense
    }

    fn health(&self) -> u32 {
        self.stats().health
    }

    fn max_health(&self) -> u32 {
        self.stats().max_health
    }

    fn is_alive(&self) -> bool {
        self.stats().is_alive()
    }

    /// Apply damage clamped to remaining health, returning what was applied.
    fn take_damage(&mut self, amount: u32) -> u32 {
        self.stats_mut().take_damage(amount)
    }
}

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    pub hit: bool,
    /// The attacker's attack stat, reported whether or not the blow landed.
    pub swing: u32,
    /// Health actually removed from the defender.
    pub applied: u32,
    /// Defender is at zero health after this strike.
    pub fatal: bool,
}

/// Highest value of the hit roll against `defense`. A roll of zero misses.
#[must_use]
pub fn hit_roll_ceiling(defense: u32) -> u32 {
    HIT_ROLL_CEILING - defense.min(DEFENSE_HIT_CAP)
}

/// Resolve `attacker` striking `defender`, mutating the defender's health.
pub fn resolve<A, D, R>(attacker: &A, defender: &mut D, rng: &mut R) -> Strike
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
    R: Rng + ?Sized,
{
    let roll = rng.gen_range(0..=hit_roll_ceiling(defender.defense()));
    let hit = roll != 0;
    let swing = attacker.attack();
    let applied = if hit { defender.take_damage(swing) } else { 0 };
    Strike {
        hit,
        swing,
        applied,
        fatal: !defender.is_alive(),
    }
}
