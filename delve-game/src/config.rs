//! Balance configuration with compiled-in defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    INTENT_SKILL_MIN_LEVEL, LEVEL_CAP, STARTING_ATTACK, STARTING_DEFENSE, STARTING_GOLD,
    STARTING_HEALTH, STARTING_MANA, STARTING_MAX_MANA, STARTING_STAMINA, XP_PER_LEVEL,
};
use crate::error::ConfigError;
use crate::progression::ProgressionRules;
use crate::species::{SpeciesDef, default_species, validate_species};

/// Stats given to a freshly created character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingStats {
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub gold: u64,
}

impl Default for StartingStats {
    fn default() -> Self {
        Self {
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            attack: STARTING_ATTACK,
            defense: STARTING_DEFENSE,
            mana: STARTING_MANA,
            max_mana: STARTING_MAX_MANA,
            stamina: STARTING_STAMINA,
            max_stamina: STARTING_STAMINA,
            gold: STARTING_GOLD,
        }
    }
}

impl StartingStats {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStartingStats`] when a current value exceeds its
    /// maximum or the character would start dead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_health == 0 || self.health == 0 {
            return Err(ConfigError::InvalidStartingStats("health must be positive"));
        }
        if self.health > self.max_health {
            return Err(ConfigError::InvalidStartingStats(
                "health exceeds max_health",
            ));
        }
        if self.mana > self.max_mana {
            return Err(ConfigError::InvalidStartingStats("mana exceeds max_mana"));
        }
        if self.stamina > self.max_stamina {
            return Err(ConfigError::InvalidStartingStats(
                "stamina exceeds max_stamina",
            ));
        }
        Ok(())
    }
}

/// Engine-wide balance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_level_cap")]
    pub level_cap: u32,
    #[serde(default = "GameConfig::default_xp_per_level")]
    pub xp_per_level: u32,
    #[serde(default = "GameConfig::default_intent_skill_min_level")]
    pub intent_skill_min_level: u32,
    /// Roll fresh stats for every spawn instead of once per species.
    #[serde(default)]
    pub reroll_per_spawn: bool,
    #[serde(default)]
    pub starting: StartingStats,
    #[serde(default = "default_species")]
    pub species: Vec<SpeciesDef>,
}

impl GameConfig {
    const fn default_level_cap() -> u32 {
        LEVEL_CAP
    }

    const fn default_xp_per_level() -> u32 {
        XP_PER_LEVEL
    }

    const fn default_intent_skill_min_level() -> u32 {
        INTENT_SKILL_MIN_LEVEL
    }

    /// Parse a JSON document; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level_cap == 0 {
            return Err(ConfigError::InvalidLevelCap(self.level_cap));
        }
        if self.xp_per_level == 0 {
            return Err(ConfigError::InvalidThreshold(self.xp_per_level));
        }
        self.starting.validate()?;
        validate_species(&self.species)
    }

    #[must_use]
    pub const fn progression(&self) -> ProgressionRules {
        ProgressionRules {
            level_cap: self.level_cap,
            xp_per_level: self.xp_per_level,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level_cap: Self::default_level_cap(),
            xp_per_level: Self::default_xp_per_level(),
            intent_skill_min_level: Self::default_intent_skill_min_level(),
            reroll_per_spawn: false,
            starting: StartingStats::default(),
            species: default_species(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level_cap, 999);
        assert_eq!(config.starting.max_stamina, 8);
        assert_eq!(config.species.len(), 9);
    }

    #[test]
    fn empty_json_takes_defaults() {
        let config = GameConfig::from_json("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = GameConfig::from_json(
            r#"{
                "xp_per_level": 25,
                "reroll_per_spawn": true,
                "starting": { "attack": 5 },
                "species": [{ "tag": "Slime", "name": "Slime", "min_level": 1, "bias": 2 }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.xp_per_level, 25);
        assert!(config.reroll_per_spawn);
        assert_eq!(config.starting.attack, 5);
        assert_eq!(config.starting.max_health, 10);
        assert_eq!(config.species[0].tag, "Slime");
        assert_eq!(config.progression().threshold(2), 50);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            GameConfig::from_json(r#"{ "level_cap": 0 }"#),
            Err(ConfigError::InvalidLevelCap(0))
        );
        assert_eq!(
            GameConfig::from_json(r#"{ "species": [] }"#),
            Err(ConfigError::EmptySpeciesTable)
        );
        assert!(matches!(
            GameConfig::from_json(r#"{ "starting": { "health": 20 } }"#),
            Err(ConfigError::InvalidStartingStats(_))
        ));
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_json(
                r#"{ "species": [{ "tag": "Titan", "name": "Titan", "min_level": 1, "bias": 20000 }] }"#
            ),
            Err(ConfigError::Overflow {
                field: "experience",
                ..
            })
        ));
    }
}
