//! The player character and its adventure/battle state machine.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{Combatant, Strike, resolve};
use crate::config::StartingStats;
use crate::constants::{FLEE_DAMAGE_DIVISOR, STARTING_LEVEL};
use crate::error::{GameError, GameResult};
use crate::persistence::{CharacterStore, PersistenceGateway};
use crate::progression::{
    self, LevelUp, Progress, ProgressionRules, Readiness, StatChoice, readiness,
};
use crate::skills::{Skill, SkillKind, SkillSpec};
use crate::species::{Enemy, SpeciesRegistry};
use crate::stats::CombatStats;

/// Top-level character state. Persisted as its integer discriminant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameMode {
    #[default]
    Adventure = 1,
    Battle = 2,
    /// Reserved; no core operation enters or reads it.
    Afk = 3,
    /// Reserved; no core operation enters or reads it.
    Trance = 4,
}

impl From<GameMode> for u8 {
    fn from(mode: GameMode) -> Self {
        mode as Self
    }
}

impl TryFrom<u8> for GameMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Adventure),
            2 => Ok(Self::Battle),
            3 => Ok(Self::Afk),
            4 => Ok(Self::Trance),
            other => Err(format!("unknown game mode {other}")),
        }
    }
}

/// Spoils of a won battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Experience actually gained; zero at the level cap.
    pub experience: u64,
    pub gold: u64,
    pub ready_to_level_up: bool,
}

/// Result of one `fight` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FightOutcome {
    /// The character's strike killed the enemy.
    Victory {
        strike: Strike,
        reward: Reward,
        enemy: Enemy,
    },
    /// Both sides struck and both survived; the battle continues.
    Exchange { strike: Strike, counter: Strike },
    /// The enemy's counter killed the character.
    Slain {
        strike: Strike,
        counter: Strike,
        enemy: Enemy,
    },
}

impl FightOutcome {
    #[must_use]
    pub const fn battle_over(&self) -> bool {
        !matches!(self, Self::Exchange { .. })
    }

    #[must_use]
    pub const fn character_died(&self) -> bool {
        matches!(self, Self::Slain { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleeOutcome {
    pub escaped: bool,
    pub damage: u32,
    /// The character must be removed with `die`.
    pub fatal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub user_id: String,
    pub stats: CombatStats,
    pub mana: u32,
    pub max_mana: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub level: u32,
    pub experience: u64,
    pub gold: u64,
    pub inventory: Vec<String>,
    pub skills: Vec<Skill>,
    mode: GameMode,
    battling: Option<Enemy>,
}

impl Character {
    /// A level 1 adventurer built from `starting`.
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        starting: &StartingStats,
    ) -> Self {
        Self {
            name: name.into(),
            user_id: user_id.into(),
            stats: CombatStats {
                health: starting.health,
                max_health: starting.max_health,
                attack: starting.attack,
                defense: starting.defense,
            },
            mana: starting.mana,
            max_mana: starting.max_mana,
            stamina: starting.stamina,
            max_stamina: starting.max_stamina,
            level: STARTING_LEVEL,
            experience: 0,
            gold: starting.gold,
            inventory: Vec::new(),
            skills: Vec::new(),
            mode: GameMode::Adventure,
            battling: None,
        }
    }

    /// Rebuild a character from stored parts. `battling` must be present exactly
    /// when `mode` is [`GameMode::Battle`].
    pub(crate) fn restore(
        mut self,
        mode: GameMode,
        battling: Option<Enemy>,
    ) -> Result<Self, String> {
        match (mode, &battling) {
            (GameMode::Battle, None) => return Err("battle mode without an enemy".into()),
            (GameMode::Battle, Some(_)) => {}
            (_, Some(_)) => return Err(format!("{mode:?} mode with an enemy")),
            (_, None) => {}
        }
        self.mode = mode;
        self.battling = battling;
        Ok(self)
    }

    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub const fn battling(&self) -> Option<&Enemy> {
        self.battling.as_ref()
    }

    /// Switch between the non-battle modes.
    ///
    /// # Errors
    ///
    /// Battle can only be entered through `hunt` and left through `fight`,
    /// `flee` or `defeat`; anything else is [`GameError::InvalidMode`].
    pub fn set_mode(&mut self, mode: GameMode) -> GameResult<()> {
        if self.mode == GameMode::Battle || mode == GameMode::Battle {
            return Err(GameError::InvalidMode {
                operation: "change mode",
                expected: GameMode::Adventure,
                actual: self.mode,
            });
        }
        self.mode = mode;
        Ok(())
    }

    fn require_mode(&self, expected: GameMode, operation: &'static str) -> GameResult<()> {
        if self.mode == expected {
            Ok(())
        } else {
            log::debug!(
                "user {} rejected {operation}: mode {:?}",
                self.user_id,
                self.mode
            );
            Err(GameError::InvalidMode {
                operation,
                expected,
                actual: self.mode,
            })
        }
    }

    fn end_battle(&mut self) {
        self.battling = None;
        self.mode = GameMode::Adventure;
    }

    /// Go looking for trouble: pick an enemy and enter battle.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMode`] unless adventuring; the character is unchanged.
    pub fn hunt<R: Rng + ?Sized>(
        &mut self,
        registry: &SpeciesRegistry,
        rng: &mut R,
    ) -> GameResult<Enemy> {
        self.require_mode(GameMode::Adventure, "hunt")?;
        let species = registry.choose(self.level, rng);
        let enemy = registry.spawn(species, rng)?;
        log::debug!(
            "user {} encountered {} ({} hp)",
            self.user_id,
            enemy.tag(),
            enemy.health()
        );
        self.battling = Some(enemy.clone());
        self.mode = GameMode::Battle;
        Ok(enemy)
    }

    /// Trade one round of blows with the current enemy. The character strikes first.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMode`] unless battling.
    pub fn fight<R: Rng + ?Sized>(
        &mut self,
        rules: &ProgressionRules,
        rng: &mut R,
    ) -> GameResult<FightOutcome> {
        self.require_mode(GameMode::Battle, "fight")?;
        let Some(mut enemy) = self.battling.take() else {
            return Err(GameError::InvalidMode {
                operation: "fight",
                expected: GameMode::Battle,
                actual: self.mode,
            });
        };

        let strike = resolve(&*self, &mut enemy, rng);
        if strike.fatal {
            let reward = self.defeat(&enemy, rules);
            return Ok(FightOutcome::Victory {
                strike,
                reward,
                enemy,
            });
        }

        let counter = resolve(&enemy, self, rng);
        if counter.fatal {
            log::debug!("user {} was slain by {}", self.user_id, enemy.tag());
            self.end_battle();
            return Ok(FightOutcome::Slain {
                strike,
                counter,
                enemy,
            });
        }

        self.battling = Some(enemy);
        Ok(FightOutcome::Exchange { strike, counter })
    }

    /// Try to run. Escape is likelier with more defense; failing costs half the
    /// enemy's attack. The battle ends either way.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMode`] unless battling.
    pub fn flee<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameResult<FleeOutcome> {
        self.require_mode(GameMode::Battle, "flee")?;
        let enemy_attack = self.battling.as_ref().map_or(0, Enemy::attack);

        let roll = rng.gen_range(0..=self.stats.defense.saturating_add(1));
        let escaped = roll != 0;
        let damage = if escaped {
            0
        } else {
            self.stats.take_damage(enemy_attack / FLEE_DAMAGE_DIVISOR)
        };
        self.end_battle();
        log::debug!(
            "user {} fled (escaped: {escaped}, damage: {damage})",
            self.user_id
        );

        Ok(FleeOutcome {
            escaped,
            damage,
            fatal: !self.stats.is_alive(),
        })
    }

    /// Collect the rewards for beating `enemy` and return to adventuring.
    pub fn defeat(&mut self, enemy: &Enemy, rules: &ProgressionRules) -> Reward {
        let experience = if rules.is_capped(self.level) {
            0
        } else {
            u64::from(enemy.experience_reward())
        };
        let gold = u64::from(enemy.gold_reward());
        self.experience = self.experience.saturating_add(experience);
        self.gold = self.gold.saturating_add(gold);
        self.end_battle();

        let ready_to_level_up = self.ready_to_level_up(rules).ready;
        log::debug!(
            "user {} defeated {} (+{experience} xp, +{gold} gold)",
            self.user_id,
            enemy.tag()
        );
        Reward {
            experience,
            gold,
            ready_to_level_up,
        }
    }

    #[must_use]
    pub fn ready_to_level_up(&self, rules: &ProgressionRules) -> Readiness {
        readiness(self.level, self.experience, rules)
    }

    pub fn level_up(&mut self, stat: StatChoice, rules: &ProgressionRules) -> LevelUp {
        progression::level_up(self, stat, rules)
    }

    #[must_use]
    pub fn progress(&self, rules: &ProgressionRules) -> Progress {
        progression::progress(self, rules)
    }

    /// Learn a new skill with a random debuff attached.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidArgument`] for an intent skill below `intent_min_level`.
    pub fn learn_skill<R: Rng + ?Sized>(
        &mut self,
        spec: SkillSpec,
        intent_min_level: u32,
        rng: &mut R,
    ) -> GameResult<&Skill> {
        if spec.kind == SkillKind::Intent && self.level < intent_min_level {
            return Err(GameError::InvalidArgument(format!(
                "intent skills require level {intent_min_level} (currently {})",
                self.level
            )));
        }
        let index = self.skills.len();
        self.skills.push(Skill::learn(spec, rng));
        Ok(&self.skills[index])
    }

    /// Write this character through `gateway`.
    ///
    /// # Errors
    ///
    /// [`GameError::StoreUnavailable`] when the store write fails.
    pub fn save_to_store<S: CharacterStore>(
        &self,
        gateway: &PersistenceGateway<S>,
    ) -> GameResult<()> {
        gateway.save(self)
    }
}

impl Combatant for Character {
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
