use clap::ValueEnum;
use delve_game::{Character, Combatant, Enemy, StatChoice};
use serde::{Deserialize, Serialize};

/// Built-in play styles for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Never runs; pours every level into attack.
    Aggressive,
    /// Runs whenever the next hit could be lethal; builds health.
    Cautious,
    /// Runs below a quarter health; rotates stats.
    Balanced,
}

impl Strategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Cautious => "Cautious",
            Self::Balanced => "Balanced",
        }
    }

    /// Decide whether to flee instead of trading another round with `enemy`.
    #[must_use]
    pub fn should_flee(self, character: &Character, enemy: &Enemy) -> bool {
        let health = character.health();
        match self {
            Self::Aggressive => false,
            Self::Cautious => health <= enemy.attack(),
            Self::Balanced => health.saturating_mul(4) < character.max_health(),
        }
    }

    #[must_use]
    pub const fn pick_stat(self, character: &Character) -> StatChoice {
        match self {
            Self::Aggressive => StatChoice::Attack,
            Self::Cautious => StatChoice::Health,
            Self::Balanced => StatChoice::ALL[(character.level % 3) as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_game::{EnemySnapshot, SpeciesRegistry, StartingStats, default_species};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rat(attack: u32) -> Enemy {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        SpeciesRegistry::build(&default_species(), false, &mut rng)
            .unwrap()
            .rehydrate(&EnemySnapshot {
                enemy: "GiantRat".into(),
                name: String::new(),
                hp: 10,
                max_hp: 10,
                attack,
                defense: 1,
                xp: 5,
                gold: 2,
            })
            .unwrap()
    }

    fn hero(health: u32) -> Character {
        let mut character = Character::new("1", "Policy", &StartingStats::default());
        character.stats.health = health;
        character
    }

    #[test]
    fn flee_thresholds_follow_strategy() {
        assert!(!Strategy::Aggressive.should_flee(&hero(1), &rat(50)));
        assert!(Strategy::Cautious.should_flee(&hero(4), &rat(4)));
        assert!(!Strategy::Cautious.should_flee(&hero(5), &rat(4)));
        assert!(Strategy::Balanced.should_flee(&hero(2), &rat(1)));
        assert!(!Strategy::Balanced.should_flee(&hero(3), &rat(50)));
    }

    #[test]
    fn balanced_rotates_stats() {
        let mut character = hero(10);
        let picks: Vec<StatChoice> = (0..3)
            .map(|level| {
                character.level = level;
                Strategy::Balanced.pick_stat(&character)
            })
            .collect();
        assert_eq!(picks, StatChoice::ALL);
        assert_eq!(Strategy::Aggressive.pick_stat(&character), StatChoice::Attack);
    }
}
