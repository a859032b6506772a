//! Delve Game Engine
//!
//! Simulation core for a persistent turn-based RPG character: enemy
//! generation, combat exchanges, progression and the adventure/battle state
//! machine. Storage and presentation are supplied by the caller.

pub mod character;
pub mod combat;
pub mod config;
pub mod constants;
pub mod error;
pub mod numbers;
pub mod persistence;
pub mod progression;
pub mod skills;
pub mod species;
pub mod stats;
pub mod store;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

// Re-export commonly used types
pub use character::{Character, FightOutcome, FleeOutcome, GameMode, Reward};
pub use combat::{Combatant, Strike, resolve};
pub use config::{GameConfig, StartingStats};
pub use error::{ConfigError, GameError, GameResult};
pub use persistence::{CharacterRecord, CharacterStore, EnemySnapshot, PersistenceGateway};
pub use progression::{LevelUp, Progress, ProgressionRules, Readiness, StatChoice};
pub use skills::{Debuff, DebuffTarget, Skill, SkillKind, SkillSpec};
pub use species::{Enemy, Species, SpeciesDef, SpeciesRegistry, default_species};
pub use stats::{CombatStats, SpeciesStats};
pub use store::{JsonFileStore, MemoryStore, StoreError};

/// Runs each gameplay command as load, mutate, save against a [`CharacterStore`].
///
/// The engine does not serialize access per user; callers must not run two
/// commands for the same user concurrently.
pub struct GameEngine<S>
where
    S: CharacterStore,
{
    config: GameConfig,
    registry: SpeciesRegistry,
    gateway: PersistenceGateway<S>,
}

impl<S> GameEngine<S>
where
    S: CharacterStore,
{
    /// Validate `config`, roll the species table and bind the store.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn new<R: Rng + ?Sized>(
        config: GameConfig,
        storage: S,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = SpeciesRegistry::build(&config.species, config.reroll_per_spawn, rng)?;
        log::debug!(
            "engine ready: {} species, level cap {}",
            registry.len(),
            config.level_cap
        );
        Ok(Self {
            config,
            registry,
            gateway: PersistenceGateway::new(storage),
        })
    }

    /// Same as [`GameEngine::new`] with the species table rolled from `seed`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn with_seed(config: GameConfig, storage: S, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, storage, &mut ChaCha20Rng::seed_from_u64(seed))
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    fn rules(&self) -> ProgressionRules {
        self.config.progression()
    }

    fn transact<T>(
        &self,
        user_id: &str,
        op: impl FnOnce(&mut Character) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut character = self.load_character(user_id)?;
        let output = op(&mut character)?;
        self.gateway.save(&character)?;
        Ok(output)
    }

    /// Create and store a new level 1 character.
    ///
    /// # Errors
    ///
    /// [`GameError::AlreadyExists`] if the user already has one.
    pub fn create_character(&self, user_id: &str, name: &str) -> GameResult<Character> {
        if self.gateway.exists(user_id)? {
            return Err(GameError::AlreadyExists {
                user_id: user_id.to_string(),
            });
        }
        let character = Character::new(user_id, name, &self.config.starting);
        self.gateway.save(&character)?;
        log::info!("created character {name} for user {user_id}");
        Ok(character)
    }

    /// # Errors
    ///
    /// [`GameError::NotFound`] if the user has no character.
    pub fn load_character(&self, user_id: &str) -> GameResult<Character> {
        self.gateway.load(user_id, &self.registry, &self.rules())
    }

    /// # Errors
    ///
    /// [`GameError::StoreUnavailable`] if the write fails.
    pub fn save_character(&self, character: &Character) -> GameResult<()> {
        self.gateway.save(character)
    }

    /// # Errors
    ///
    /// Load errors, or [`GameError::InvalidMode`] unless adventuring.
    pub fn hunt<R: Rng + ?Sized>(&self, user_id: &str, rng: &mut R) -> GameResult<Enemy> {
        self.transact(user_id, |character| character.hunt(&self.registry, rng))
    }

    /// Fight one round. A slain character is deleted before this returns.
    ///
    /// # Errors
    ///
    /// Load errors, or [`GameError::InvalidMode`] unless battling.
    pub fn fight<R: Rng + ?Sized>(&self, user_id: &str, rng: &mut R) -> GameResult<FightOutcome> {
        let rules = self.rules();
        let mut character = self.load_character(user_id)?;
        let outcome = character.fight(&rules, rng)?;
        if outcome.character_died() {
            self.die(user_id)?;
        } else {
            self.gateway.save(&character)?;
        }
        Ok(outcome)
    }

    /// Attempt to flee. A fatal flee is saved as-is; the caller must call [`GameEngine::die`].
    ///
    /// # Errors
    ///
    /// Load errors, or [`GameError::InvalidMode`] unless battling.
    pub fn flee<R: Rng + ?Sized>(&self, user_id: &str, rng: &mut R) -> GameResult<FleeOutcome> {
        self.transact(user_id, |character| character.flee(rng))
    }

    /// Permanently delete the user's character. Returns whether a record existed.
    ///
    /// # Errors
    ///
    /// [`GameError::StoreUnavailable`] if the store cannot be written.
    pub fn die(&self, user_id: &str) -> GameResult<bool> {
        log::info!("character for user {user_id} died");
        self.gateway.delete(user_id)
    }

    /// # Errors
    ///
    /// [`GameError::NotFound`] if the user has no character.
    pub fn ready_to_level_up(&self, user_id: &str) -> GameResult<Readiness> {
        Ok(self
            .load_character(user_id)?
            .ready_to_level_up(&self.rules()))
    }

    /// # Errors
    ///
    /// [`GameError::NotFound`] if the user has no character.
    pub fn progress(&self, user_id: &str) -> GameResult<Progress> {
        Ok(self.load_character(user_id)?.progress(&self.rules()))
    }

    /// Level up on the stat named by `stat`. Not being ready is a no-op and is not saved.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidArgument`] for an unknown stat name, or load errors.
    pub fn level_up(&self, user_id: &str, stat: &str) -> GameResult<LevelUp> {
        let choice: StatChoice = stat.parse()?;
        let rules = self.rules();
        let mut character = self.load_character(user_id)?;
        let result = character.level_up(choice, &rules);
        if result.leveled {
            self.gateway.save(&character)?;
        }
        Ok(result)
    }

    /// # Errors
    ///
    /// [`GameError::InvalidArgument`] for a gated intent skill, or load errors.
    pub fn learn_skill<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        spec: SkillSpec,
        rng: &mut R,
    ) -> GameResult<Skill> {
        let min_level = self.config.intent_skill_min_level;
        self.transact(user_id, |character| {
            character
                .learn_skill(spec, min_level, rng)
                .map(Clone::clone)
        })
    }
}
