//! Species catalog, enemy spawning and enemy rehydration.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::combat::Combatant;
use crate::error::{ConfigError, GameError};
use crate::persistence::EnemySnapshot;
use crate::stats::{CombatStats, SpeciesStats, experience_range, generate, stat_ranges};

/// Table entry describing a species before its stats are rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesDef {
    /// Stable key written into persisted enemy snapshots.
    pub tag: String,
    pub name: String,
    pub min_level: u32,
    pub bias: u32,
}

impl SpeciesDef {
    pub fn new(tag: impl Into<String>, name: impl Into<String>, min_level: u32, bias: u32) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            min_level,
            bias,
        }
    }
}

/// The built-in species table, ordered by minimum level.
#[must_use]
pub fn default_species() -> Vec<SpeciesDef> {
    vec![
        SpeciesDef::new("GiantRat", "Giant Rat", 1, 1),
        SpeciesDef::new("GiantSpider", "Giant Spider", 3, 2),
        SpeciesDef::new("Bat", "Bat", 5, 3),
        SpeciesDef::new("Skeleton", "Skeleton", 10, 5),
        SpeciesDef::new("Wolf", "Wolf", 15, 8),
        SpeciesDef::new("Ogre", "Ogre", 25, 10),
        SpeciesDef::new("Living_Armor", "Living Armor", 30, 15),
        SpeciesDef::new("Bear", "Bear", 40, 25),
        SpeciesDef::new("Drake", "Lesser Drake", 80, 40),
    ]
}

/// Check a species table without rolling anything.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found: an empty table, a duplicated tag,
/// or parameters whose stat ranges are invalid. The experience range is checked
/// against the largest stat total the ranges allow, so no later roll can overflow.
pub fn validate_species(defs: &[SpeciesDef]) -> Result<(), ConfigError> {
    if defs.is_empty() {
        return Err(ConfigError::EmptySpeciesTable);
    }
    let mut seen = HashSet::new();
    for def in defs {
        if !seen.insert(def.tag.as_str()) {
            return Err(ConfigError::DuplicateSpecies(def.tag.clone()));
        }
        let ranges = stat_ranges(def.min_level, def.bias)?;
        let worst_total = u64::from(*ranges.health.end())
            + u64::from(*ranges.attack.end())
            + u64::from(*ranges.defense.end());
        experience_range(def.min_level, def.bias, worst_total)?;
    }
    Ok(())
}

/// A species with its balance numbers fixed for the lifetime of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    def: SpeciesDef,
    stats: SpeciesStats,
}

impl Species {
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.def.tag
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub const fn min_level(&self) -> u32 {
        self.def.min_level
    }

    #[must_use]
    pub const fn bias(&self) -> u32 {
        self.def.bias
    }

    #[must_use]
    pub const fn stats(&self) -> &SpeciesStats {
        &self.stats
    }
}

/// An enemy in combat. Only its health changes after it is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    tag: String,
    name: String,
    stats: CombatStats,
    experience_reward: u32,
    gold_reward: u32,
}

impl Enemy {
    fn from_species(species: &Species, rolled: SpeciesStats) -> Self {
        Self {
            tag: species.tag().to_string(),
            name: species.name().to_string(),
            stats: rolled.stats,
            experience_reward: rolled.experience_reward,
            gold_reward: rolled.gold_reward,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub const fn experience_reward(&self) -> u32 {
        self.experience_reward
    }

    #[must_use]
    pub const fn gold_reward(&self) -> u32 {
        self.gold_reward
    }
}

impl Combatant for Enemy {
    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }
}

/// Ordered, tag-addressable species catalog.
#[derive(Debug, Clone)]
pub struct SpeciesRegistry {
    species: Vec<Species>,
    lowest: usize,
    reroll_per_spawn: bool,
}

impl SpeciesRegistry {
    /// Validate the table and roll each species' stats once.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when [`validate_species`] rejects the table.
    pub fn build<R: Rng + ?Sized>(
        defs: &[SpeciesDef],
        reroll_per_spawn: bool,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        validate_species(defs)?;
        let mut species = Vec::with_capacity(defs.len());
        for def in defs {
            let stats = generate(def.min_level, def.bias, rng)?;
            log::debug!(
                "rolled species {} (min level {}, bias {}): {:?}",
                def.tag,
                def.min_level,
                def.bias,
                stats
            );
            species.push(Species {
                def: def.clone(),
                stats,
            });
        }
        let lowest = species
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.min_level())
            .map_or(0, |(index, _)| index);
        Ok(Self {
            species,
            lowest,
            reroll_per_spawn,
        })
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.tag() == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    #[must_use]
    pub const fn rerolls_per_spawn(&self) -> bool {
        self.reroll_per_spawn
    }

    /// The species with the lowest minimum level.
    #[must_use]
    pub fn lowest(&self) -> &Species {
        &self.species[self.lowest]
    }

    /// Species a character of `level` may encounter.
    #[must_use]
    pub fn eligible_species(&self, level: u32) -> Vec<&Species> {
        self.species
            .iter()
            .filter(|s| s.min_level() <= level)
            .collect()
    }

    /// Uniformly pick an eligible species, falling back to the lowest-level one.
    pub fn choose<R: Rng + ?Sized>(&self, level: u32, rng: &mut R) -> &Species {
        let eligible = self.eligible_species(level);
        match eligible.choose(rng).copied() {
            Some(species) => species,
            None => {
                log::debug!(
                    "no species eligible at level {level}; falling back to {}",
                    self.lowest().tag()
                );
                self.lowest()
            }
        }
    }

    /// Create a full-health enemy of `species`.
    ///
    /// # Errors
    ///
    /// Only fails when re-rolling is enabled and a roll overflows. [`validate_species`]
    /// checks the largest possible roll, so a registry from [`SpeciesRegistry::build`]
    /// never hits this.
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        species: &Species,
        rng: &mut R,
    ) -> Result<Enemy, ConfigError> {
        let rolled = if self.reroll_per_spawn {
            generate(species.min_level(), species.bias(), rng)?
        } else {
            species.stats
        };
        Ok(Enemy::from_species(species, rolled))
    }

    /// Rebuild an in-progress enemy from a persisted snapshot without re-rolling.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownSpecies`] when the tag is not in the registry.
    pub fn rehydrate(&self, snapshot: &EnemySnapshot) -> Result<Enemy, GameError> {
        let species = self
            .get(&snapshot.enemy)
            .ok_or_else(|| GameError::UnknownSpecies(snapshot.enemy.clone()))?;
        let mut stats = CombatStats {
            health: snapshot.hp,
            max_health: snapshot.max_hp,
            attack: snapshot.attack,
            defense: snapshot.defense,
        };
        stats.clamp();
        let name = if snapshot.name.is_empty() {
            species.name().to_string()
        } else {
            snapshot.name.clone()
        };
        Ok(Enemy {
            tag: species.tag().to_string(),
            name,
            stats,
            experience_reward: snapshot.xp,
            gold_reward: snapshot.gold,
        })
    }
}
