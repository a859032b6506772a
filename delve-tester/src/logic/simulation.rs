use delve_game::{
    Character, CharacterStore, Combatant, FightOutcome, GameEngine, GameError, GameMode,
    GameResult,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::logic::policy::Strategy;

/// Configuration for a single automated run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub iteration: usize,
    pub strategy: Strategy,
    pub max_turns: u32,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: Strategy, seed: u64, iteration: usize) -> Self {
        Self {
            seed,
            iteration,
            strategy,
            max_turns: 500,
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Stable per-run user id so file-backed runs never collide.
    #[must_use]
    pub fn user_id(&self) -> String {
        let mut hasher = XxHash64::with_seed(self.seed);
        hasher.write(self.strategy.label().as_bytes());
        hasher.write(&self.iteration.to_le_bytes());
        format!("sim-{:016x}", hasher.finish())
    }
}

/// Outcome of one automated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub iteration: usize,
    pub user_id: String,
    pub strategy: Strategy,
    pub final_level: u32,
    pub experience: u64,
    pub gold: u64,
    pub kills: u32,
    pub flees: u32,
    pub deaths: u32,
    pub turns: u32,
    pub highest_species: Option<String>,
    pub violations: Vec<String>,
}

impl RunSummary {
    #[must_use]
    pub const fn survived(&self) -> bool {
        self.deaths == 0
    }
}

enum BattleEnd {
    Won,
    Fled,
    Died,
    OutOfTurns,
}

/// Drives one character through hunts and battles via a [`GameEngine`].
pub struct SimulationSession<'a, S: CharacterStore> {
    engine: &'a GameEngine<S>,
    config: SimulationConfig,
    user_id: String,
    summary: RunSummary,
    highest_min_level: u32,
}

impl<'a, S: CharacterStore> SimulationSession<'a, S> {
    #[must_use]
    pub fn new(engine: &'a GameEngine<S>, config: SimulationConfig) -> Self {
        let user_id = config.user_id();
        let summary = RunSummary {
            seed: config.seed,
            iteration: config.iteration,
            user_id: user_id.clone(),
            strategy: config.strategy,
            final_level: 0,
            experience: 0,
            gold: 0,
            kills: 0,
            flees: 0,
            deaths: 0,
            turns: 0,
            highest_species: None,
            violations: Vec::new(),
        };
        Self {
            engine,
            config,
            user_id,
            summary,
            highest_min_level: 0,
        }
    }

    /// Play until the character dies or the turn budget runs out.
    ///
    /// # Errors
    ///
    /// Any engine error other than the expected ones is returned unchanged.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> GameResult<RunSummary> {
        let character = match self.engine.create_character(&self.user_id, "Simulant") {
            Ok(character) => character,
            Err(GameError::AlreadyExists { .. }) => {
                log::debug!("replacing leftover character {}", self.user_id);
                self.engine.die(&self.user_id)?;
                self.engine.create_character(&self.user_id, "Simulant")?
            }
            Err(err) => return Err(err),
        };
        self.record(&character);

        while self.summary.turns < self.config.max_turns {
            let enemy = self.engine.hunt(&self.user_id, rng)?;
            self.summary.turns += 1;
            if let Some(species) = self.engine.registry().get(enemy.tag())
                && species.min_level() >= self.highest_min_level
            {
                self.highest_min_level = species.min_level();
                self.summary.highest_species = Some(species.name().to_string());
            }

            match self.battle(rng)? {
                BattleEnd::Died => {
                    self.summary.deaths += 1;
                    if self.engine.gateway().exists(&self.user_id)? {
                        self.violation("dead character still stored".to_string());
                    }
                    return Ok(self.summary);
                }
                BattleEnd::OutOfTurns => break,
                BattleEnd::Won | BattleEnd::Fled => {}
            }
            self.level_up_while_ready()?;
        }

        let character = self.engine.load_character(&self.user_id)?;
        self.record(&character);
        self.engine.die(&self.user_id)?;
        Ok(self.summary)
    }

    fn battle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameResult<BattleEnd> {
        loop {
            if self.summary.turns >= self.config.max_turns {
                return Ok(BattleEnd::OutOfTurns);
            }
            let character = self.engine.load_character(&self.user_id)?;
            self.record(&character);
            let Some(enemy) = character.battling() else {
                self.violation("battle ended without an outcome".to_string());
                return Ok(BattleEnd::Won);
            };

            if self.config.strategy.should_flee(&character, enemy) {
                let outcome = self.engine.flee(&self.user_id, rng)?;
                self.summary.turns += 1;
                self.summary.flees += 1;
                if outcome.fatal {
                    self.engine.die(&self.user_id)?;
                    return Ok(BattleEnd::Died);
                }
                self.expect_adventuring()?;
                return Ok(BattleEnd::Fled);
            }

            let outcome = self.engine.fight(&self.user_id, rng)?;
            self.summary.turns += 1;
            match outcome {
                FightOutcome::Victory { reward, .. } => {
                    self.summary.kills += 1;
                    if reward.experience == 0 && !self.is_capped() {
                        self.violation("victory below the cap awarded no experience".to_string());
                    }
                    self.expect_adventuring()?;
                    return Ok(BattleEnd::Won);
                }
                FightOutcome::Slain { .. } => return Ok(BattleEnd::Died),
                FightOutcome::Exchange { .. } => {}
            }
        }
    }

    fn level_up_while_ready(&mut self) -> GameResult<()> {
        while self.engine.ready_to_level_up(&self.user_id)?.ready {
            let character = self.engine.load_character(&self.user_id)?;
            let before = character.level;
            let stat = self.config.strategy.pick_stat(&character);
            let result = self.engine.level_up(&self.user_id, stat.key())?;
            if !result.leveled || result.level != before + 1 {
                self.violation(format!("level up from {before} reported {result:?}"));
                break;
            }
            let character = self.engine.load_character(&self.user_id)?;
            if character.health() != character.max_health() {
                self.violation(format!("level {} did not restore health", character.level));
            }
            self.record(&character);
        }
        Ok(())
    }

    fn expect_adventuring(&mut self) -> GameResult<()> {
        let character = self.engine.load_character(&self.user_id)?;
        if character.mode() != GameMode::Adventure {
            self.violation(format!("battle ended in {:?} mode", character.mode()));
        }
        self.record(&character);
        Ok(())
    }

    fn is_capped(&self) -> bool {
        self.engine
            .config()
            .progression()
            .is_capped(self.summary.final_level)
    }

    /// Check core invariants and remember the latest known state.
    fn record(&mut self, character: &Character) {
        let level_cap = self.engine.config().level_cap;
        if character.health() > character.max_health() {
            self.violation(format!(
                "health {} above max {}",
                character.health(),
                character.max_health()
            ));
        }
        if character.battling().is_some() != (character.mode() == GameMode::Battle) {
            self.violation(format!(
                "mode {:?} paired with battling={}",
                character.mode(),
                character.battling().is_some()
            ));
        }
        if character.level == 0 || character.level > level_cap {
            self.violation(format!("level {} outside 1..={level_cap}", character.level));
        }
        if character.level < self.summary.final_level {
            self.violation(format!(
                "level dropped from {} to {}",
                self.summary.final_level, character.level
            ));
        }
        self.summary.final_level = character.level;
        self.summary.experience = character.experience;
        self.summary.gold = character.gold;
    }

    fn violation(&mut self, message: String) {
        log::warn!(
            "seed {} iteration {}: {message}",
            self.config.seed,
            self.config.iteration
        );
        self.summary.violations.push(message);
    }
}
