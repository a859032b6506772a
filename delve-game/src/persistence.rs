//! Stored record layout and the gateway between characters and a key-value store.

use serde::{Deserialize, Serialize};

use crate::character::{Character, GameMode};
use crate::combat::Combatant;
use crate::config::StartingStats;
use crate::error::{GameError, GameResult};
use crate::progression::ProgressionRules;
use crate::skills::Skill;
use crate::species::{Enemy, SpeciesRegistry};
use crate::stats::CombatStats;

/// Persisted form of an in-progress enemy, keyed by its species tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub enemy: String,
    #[serde(default)]
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub xp: u32,
    pub gold: u32,
}

impl From<&Enemy> for EnemySnapshot {
    fn from(enemy: &Enemy) -> Self {
        Self {
            enemy: enemy.tag().to_string(),
            name: enemy.name().to_string(),
            hp: enemy.health(),
            max_hp: enemy.max_health(),
            attack: enemy.attack(),
            defense: enemy.defense(),
            xp: enemy.experience_reward(),
            gold: enemy.gold_reward(),
        }
    }
}

/// One character as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub xp: u64,
    pub level: u32,
    pub gold: u64,
    #[serde(default)]
    pub inventory: Vec<String>,
    pub mode: GameMode,
    #[serde(default)]
    pub battling: Option<EnemySnapshot>,
    pub user_id: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl From<&Character> for CharacterRecord {
    fn from(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            hp: character.stats.health,
            max_hp: character.stats.max_health,
            attack: character.stats.attack,
            defense: character.stats.defense,
            mana: character.mana,
            max_mana: character.max_mana,
            stamina: character.stamina,
            max_stamina: character.max_stamina,
            xp: character.experience,
            level: character.level,
            gold: character.gold,
            inventory: character.inventory.clone(),
            mode: character.mode(),
            battling: character.battling().map(EnemySnapshot::from),
            user_id: character.user_id.clone(),
            skills: character.skills.clone(),
        }
    }
}

impl CharacterRecord {
    /// Rebuild the character, rehydrating any embedded enemy through `registry`.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownSpecies`] for an unregistered enemy tag and
    /// [`GameError::CorruptRecord`] when the record breaks a character invariant.
    pub fn into_character(
        self,
        registry: &SpeciesRegistry,
        rules: &ProgressionRules,
    ) -> GameResult<Character> {
        let corrupt = |reason: String| GameError::CorruptRecord {
            user_id: self.user_id.clone(),
            reason,
        };
        if self.level == 0 || self.level > rules.level_cap {
            return Err(corrupt(format!(
                "level {} outside 1..={}",
                self.level, rules.level_cap
            )));
        }
        if self.hp > self.max_hp {
            return Err(corrupt(format!(
                "hp {} exceeds max_hp {}",
                self.hp, self.max_hp
            )));
        }

        let battling = self
            .battling
            .as_ref()
            .map(|snapshot| registry.rehydrate(snapshot))
            .transpose()?;

        let mut character = Character::new(
            self.user_id.clone(),
            self.name.clone(),
            &StartingStats::default(),
        );
        character.stats = CombatStats {
            health: self.hp,
            max_health: self.max_hp,
            attack: self.attack,
            defense: self.defense,
        };
        character.mana = self.mana;
        character.max_mana = self.max_mana;
        character.stamina = self.stamina;
        character.max_stamina = self.max_stamina;
        character.experience = self.xp;
        character.level = self.level;
        character.gold = self.gold;
        character.inventory = self.inventory.clone();
        character.skills = self.skills.clone();
        character.restore(self.mode, battling).map_err(corrupt)
    }
}

/// Key-value contract the core needs from a backing store.
///
/// Writes are full overwrites; an absent key means no character exists.
pub trait CharacterStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the record for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn read(&self, user_id: &str) -> Result<Option<CharacterRecord>, Self::Error>;

    /// Replace the record for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn write(&self, user_id: &str, record: &CharacterRecord) -> Result<(), Self::Error>;

    /// Remove the record for `user_id`, reporting whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, user_id: &str) -> Result<bool, Self::Error>;
}

impl<S: CharacterStore + ?Sized> CharacterStore for &S {
    type Error = S::Error;

    fn read(&self, user_id: &str) -> Result<Option<CharacterRecord>, Self::Error> {
        (**self).read(user_id)
    }

    fn write(&self, user_id: &str, record: &CharacterRecord) -> Result<(), Self::Error> {
        (**self).write(user_id, record)
    }

    fn remove(&self, user_id: &str) -> Result<bool, Self::Error> {
        (**self).remove(user_id)
    }
}

/// Saves and loads whole characters through a [`CharacterStore`].
#[derive(Debug, Clone, Default)]
pub struct PersistenceGateway<S> {
    store: S,
}

impl<S: CharacterStore> PersistenceGateway<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Overwrite the stored record with the full character state.
    ///
    /// # Errors
    ///
    /// [`GameError::StoreUnavailable`] when the write fails.
    pub fn save(&self, character: &Character) -> GameResult<()> {
        let record = CharacterRecord::from(character);
        self.store
            .write(&character.user_id, &record)
            .map_err(|err| {
                log::warn!("saving user {} failed: {err}", character.user_id);
                GameError::store(err)
            })
    }

    /// Load and rehydrate the character for `user_id`.
    ///
    /// # Errors
    ///
    /// [`GameError::NotFound`] when no record exists,
    /// [`GameError::CorruptRecord`] when the record names a different user, plus
    /// any error from [`CharacterRecord::into_character`] or the store.
    pub fn load(
        &self,
        user_id: &str,
        registry: &SpeciesRegistry,
        rules: &ProgressionRules,
    ) -> GameResult<Character> {
        let record = self
            .store
            .read(user_id)
            .map_err(|err| {
                log::warn!("loading user {user_id} failed: {err}");
                GameError::store(err)
            })?
            .ok_or_else(|| GameError::NotFound {
                user_id: user_id.to_string(),
            })?;
        if record.user_id != user_id {
            return Err(GameError::CorruptRecord {
                user_id: user_id.to_string(),
                reason: format!("record belongs to user {}", record.user_id),
            });
        }
        record.into_character(registry, rules)
    }

    /// # Errors
    ///
    /// [`GameError::StoreUnavailable`] when the read fails.
    pub fn exists(&self, user_id: &str) -> GameResult<bool> {
        self.store
            .read(user_id)
            .map(|record| record.is_some())
            .map_err(GameError::store)
    }

    /// Remove the record for `user_id`; a missing record is not an error.
    ///
    /// # Errors
    ///
    /// [`GameError::StoreUnavailable`] when the removal fails.
    pub fn delete(&self, user_id: &str) -> GameResult<bool> {
        let removed = self.store.remove(user_id).map_err(GameError::store)?;
        if !removed {
            log::warn!("no stored character to delete for user {user_id}");
        }
        Ok(removed)
    }
}
