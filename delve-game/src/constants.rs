//! Centralized balance and tuning constants for Delve game logic.
//!
//! These are the compiled-in defaults; `GameConfig` can override the ones that
//! are exposed as configuration.

// Progression --------------------------------------------------------------
pub const LEVEL_CAP: u32 = 999;
pub const XP_PER_LEVEL: u32 = 10;
pub const STARTING_LEVEL: u32 = 1;
pub const INTENT_SKILL_MIN_LEVEL: u32 = 200;

// Combat -------------------------------------------------------------------
/// Defense above this value no longer lowers the hit roll ceiling.
pub const DEFENSE_HIT_CAP: u32 = 19;
pub const HIT_ROLL_CEILING: u32 = 20;
pub const FLEE_DAMAGE_DIVISOR: u32 = 2;

// Stat generation multipliers ----------------------------------------------
pub const HEALTH_FLOOR_PER_LEVEL: u64 = 10;
pub const HEALTH_CEIL_PER_LEVEL: u64 = 20;
pub const ATTACK_FLOOR_PER_LEVEL: u64 = 2;
pub const ATTACK_CEIL_PER_LEVEL: u64 = 4;
pub const DEFENSE_FLOOR_PER_LEVEL: u64 = 1;
pub const DEFENSE_CEIL_PER_LEVEL: u64 = 2;
pub const GOLD_CEIL_PER_LEVEL: u64 = 10;

// Skills -------------------------------------------------------------------
pub const SKILL_DEBUFF_MIN: u32 = 1;
pub const SKILL_DEBUFF_MAX: u32 = 100;

// New character defaults ---------------------------------------------------
pub const STARTING_HEALTH: u32 = 10;
pub const STARTING_ATTACK: u32 = 2;
pub const STARTING_DEFENSE: u32 = 1;
pub const STARTING_MANA: u32 = 0;
pub const STARTING_MAX_MANA: u32 = 10;
pub const STARTING_STAMINA: u32 = 8;
pub const STARTING_GOLD: u64 = 0;
